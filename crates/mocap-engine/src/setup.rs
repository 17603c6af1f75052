//! OpenSim tool setup documents.
//!
//! Each `render_*` function produces the XML consumed by `opensim-cmd run-tool`
//! for one engine operation.

use std::fmt::Display;
use std::path::Path;

use mocap_model::{MarkerWeight, TimeRange};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::engine::{IdRequest, IkRequest, ScaleRequest};
use crate::error::EngineError;

/// Document version understood by OpenSim 4.x.
const DOCUMENT_VERSION: &str = "40000";

/// Frame in which force vectors and application points are expressed.
const GROUND_BODY: &str = "ground";

struct SetupDocument {
    document: &'static str,
    xml: Writer<Vec<u8>>,
}

impl SetupDocument {
    fn new(document: &'static str) -> Result<Self, EngineError> {
        let mut doc = Self {
            document,
            xml: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        doc.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("OpenSimDocument");
        root.push_attribute(("Version", DOCUMENT_VERSION));
        doc.write(Event::Start(root))?;
        Ok(doc)
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), EngineError> {
        let document = self.document;
        self.xml
            .write_event(event)
            .map_err(|e| xml_error(document, e))
    }

    fn open(&mut self, tag: &str, name: Option<&str>) -> Result<(), EngineError> {
        let mut start = BytesStart::new(tag);
        if let Some(name) = name {
            start.push_attribute(("name", name));
        }
        self.write(Event::Start(start))
    }

    fn close(&mut self, tag: &str) -> Result<(), EngineError> {
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn text(&mut self, tag: &str, text: &str) -> Result<(), EngineError> {
        self.write(Event::Start(BytesStart::new(tag)))?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.write(Event::End(BytesEnd::new(tag)))
    }

    fn finish(mut self) -> Result<String, EngineError> {
        self.close("OpenSimDocument")?;
        let document = self.document;
        String::from_utf8(self.xml.into_inner()).map_err(|e| xml_error(document, e))
    }
}

fn xml_error(document: &'static str, error: impl Display) -> EngineError {
    EngineError::Xml {
        document,
        message: error.to_string(),
    }
}

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn range_text(range: TimeRange) -> String {
    format!("{} {}", range.start, range.end)
}

fn path_text(path: &Path) -> String {
    path.display().to_string()
}

fn write_marker_tasks(doc: &mut SetupDocument, weights: &[MarkerWeight]) -> Result<(), EngineError> {
    doc.open("IKTaskSet", None)?;
    doc.open("objects", None)?;
    for weight in weights {
        doc.open("IKMarkerTask", Some(&weight.marker))?;
        doc.text("apply", flag(weight.apply))?;
        doc.text("weight", &weight.weight.to_string())?;
        doc.close("IKMarkerTask")?;
    }
    doc.close("objects")?;
    doc.close("IKTaskSet")
}

/// ScaleTool setup: measurement-based scaling, marker placement disabled.
pub fn render_scale_setup(request: &ScaleRequest<'_>) -> Result<String, EngineError> {
    let marker_file = path_text(request.marker_file);
    let output_model = path_text(request.output_model);
    let time_range = range_text(request.time_range);

    let mut doc = SetupDocument::new("ScaleTool")?;
    doc.open("ScaleTool", Some(request.name))?;
    doc.text("mass", &request.subject_mass.to_string())?;

    doc.open("GenericModelMaker", None)?;
    doc.text("model_file", &path_text(request.generic_model))?;
    doc.close("GenericModelMaker")?;

    doc.open("ModelScaler", None)?;
    doc.text("apply", flag(true))?;
    doc.text("scaling_order", "measurements")?;
    doc.open("MeasurementSet", None)?;
    doc.open("objects", None)?;
    for measurement in request.measurements {
        doc.open("Measurement", Some(&measurement.name))?;
        doc.text("apply", flag(true))?;
        doc.open("MarkerPairSet", None)?;
        doc.open("objects", None)?;
        for pair in &measurement.marker_pairs {
            doc.open("MarkerPair", None)?;
            doc.text("markers", &format!("{} {}", pair.first, pair.second))?;
            doc.close("MarkerPair")?;
        }
        doc.close("objects")?;
        doc.close("MarkerPairSet")?;
        doc.open("BodyScaleSet", None)?;
        doc.open("objects", None)?;
        let axes = measurement.axis_names().collect::<Vec<_>>().join(" ");
        for body in &measurement.bodies {
            doc.open("BodyScale", Some(body))?;
            doc.text("axes", &axes)?;
            doc.close("BodyScale")?;
        }
        doc.close("objects")?;
        doc.close("BodyScaleSet")?;
        doc.close("Measurement")?;
    }
    doc.close("objects")?;
    doc.close("MeasurementSet")?;
    doc.text("marker_file", &marker_file)?;
    doc.text("time_range", &time_range)?;
    doc.text("output_model_file", &output_model)?;
    doc.close("ModelScaler")?;

    doc.open("MarkerPlacer", None)?;
    doc.text("apply", flag(false))?;
    write_marker_tasks(&mut doc, request.marker_weights)?;
    doc.text("marker_file", &marker_file)?;
    doc.text("time_range", &time_range)?;
    doc.text("output_model_file", &output_model)?;
    doc.close("MarkerPlacer")?;

    doc.close("ScaleTool")?;
    doc.finish()
}

/// InverseKinematicsTool setup for one trial.
pub fn render_ik_setup(request: &IkRequest<'_>) -> Result<String, EngineError> {
    let mut doc = SetupDocument::new("InverseKinematicsTool")?;
    doc.open("InverseKinematicsTool", Some(request.trial))?;
    doc.text("model_file", &path_text(request.model))?;
    write_marker_tasks(&mut doc, request.marker_weights)?;
    doc.text("marker_file", &path_text(request.marker_file))?;
    doc.text("time_range", &range_text(request.time_range))?;
    doc.text("output_motion_file", &path_text(request.output))?;
    doc.close("InverseKinematicsTool")?;
    doc.finish()
}

/// ExternalLoads descriptor: one ExternalForce per definition, all expressed
/// in the ground frame and read from the trial's GRF file.
pub fn render_external_loads(request: &IdRequest<'_>) -> Result<String, EngineError> {
    let name = format!("{}_external_loads", request.trial);
    let mut doc = SetupDocument::new("ExternalLoads")?;
    doc.open("ExternalLoads", Some(&name))?;
    doc.open("objects", None)?;
    for load in request.external_loads {
        doc.open("ExternalForce", Some(&load.name))?;
        doc.text("applied_to_body", &load.body)?;
        doc.text("force_expressed_in_body", GROUND_BODY)?;
        doc.text("point_expressed_in_body", GROUND_BODY)?;
        doc.text("force_identifier", &load.force_identifier)?;
        doc.text("point_identifier", &load.point_identifier)?;
        doc.text("torque_identifier", &load.torque_identifier)?;
        doc.close("ExternalForce")?;
    }
    doc.close("objects")?;
    doc.text("datafile", &path_text(request.forces_file))?;
    doc.close("ExternalLoads")?;
    doc.finish()
}

/// InverseDynamicsTool setup for one trial.
pub fn render_id_setup(request: &IdRequest<'_>) -> Result<String, EngineError> {
    let output_name = request
        .output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut doc = SetupDocument::new("InverseDynamicsTool")?;
    doc.open("InverseDynamicsTool", Some(request.trial))?;
    doc.text("results_directory", &path_text(request.results_dir()))?;
    doc.text("model_file", &path_text(request.model))?;
    doc.text("time_range", &range_text(request.time_range))?;
    doc.text("forces_to_exclude", &request.excluded_forces.join(" "))?;
    doc.text(
        "external_loads_file",
        &path_text(&request.external_loads_file()),
    )?;
    doc.text("coordinates_file", &path_text(request.coordinates_file))?;
    doc.text(
        "lowpass_cutoff_frequency_for_coordinates",
        &request.low_pass_cutoff.to_string(),
    )?;
    doc.text("output_gen_force_file", &output_name)?;
    doc.close("InverseDynamicsTool")?;
    doc.finish()
}
