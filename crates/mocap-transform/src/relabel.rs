//! Force-plate channel relabeling.
//!
//! Flattened force tables arrive with labels `<type><platform>_<component>`
//! (`f1_1`, `p2_3`, `m1_2`, ...). The model expects
//! `ground_force_<platform>_v<axis>`, `ground_force_<platform>_p<axis>` and
//! `ground_torque_<platform>_<axis>`.

use mocap_model::{ForceTable, TableError};

/// Map one flattened force-plate label; anything else is returned unchanged.
///
/// Only the first four characters are inspected, so trailing characters
/// after a matching prefix are dropped.
pub fn relabel_grf_label(label: &str) -> String {
    let bytes = label.as_bytes();
    if bytes.len() < 4 || bytes[2] != b'_' || !bytes[1].is_ascii_digit() {
        return label.to_string();
    }
    let axis = match bytes[3] {
        b'1' => 'x',
        b'2' => 'y',
        b'3' => 'z',
        _ => return label.to_string(),
    };
    let platform = char::from(bytes[1]);
    match bytes[0] {
        b'f' => format!("ground_force_{platform}_v{axis}"),
        b'p' => format!("ground_force_{platform}_p{axis}"),
        b'm' => format!("ground_torque_{platform}_{axis}"),
        _ => label.to_string(),
    }
}

/// Rename every column of a flattened force table in place.
///
/// Column order and values are untouched.
pub fn relabel_force_columns(table: &mut ForceTable) -> Result<(), TableError> {
    let labels = table
        .labels()
        .iter()
        .map(|label| relabel_grf_label(label))
        .collect();
    table.set_labels(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_force_point_and_moment_channels() {
        assert_eq!(relabel_grf_label("f1_1"), "ground_force_1_vx");
        assert_eq!(relabel_grf_label("f2_2"), "ground_force_2_vy");
        assert_eq!(relabel_grf_label("p2_3"), "ground_force_2_pz");
        assert_eq!(relabel_grf_label("m1_2"), "ground_torque_1_y");
        assert_eq!(relabel_grf_label("m3_3"), "ground_torque_3_z");
    }

    #[test]
    fn unrecognised_labels_pass_through() {
        for label in ["time", "f1", "x1_1", "f1-1", "fa_1", "f1_4", "f1_0", "", "ü1_1"] {
            assert_eq!(relabel_grf_label(label), label);
        }
    }

    #[test]
    fn relabels_table_in_order() {
        let labels = ["f1_1", "f1_2", "f1_3", "p1_1", "m1_3", "other"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let mut table = ForceTable::new(labels).unwrap();
        table.push_frame(0.0, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

        relabel_force_columns(&mut table).unwrap();

        assert_eq!(
            table.labels(),
            &[
                "ground_force_1_vx",
                "ground_force_1_vy",
                "ground_force_1_vz",
                "ground_force_1_px",
                "ground_torque_1_z",
                "other"
            ]
        );
        assert_eq!(table.row(0), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
