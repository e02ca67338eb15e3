use std::fs;
use std::path::Path;

use crate::models::config::AdapterDescriptor;
use crate::models::error::PassthroughError;

/// Read the adapter layout: a JSON array of adapters and their ports.
///
/// ```json
/// [{ "name": "primary", "ports": [{ "id": 0, "direction": "out", "name": "AOP" }] }]
/// ```
pub fn load_adapter_layout(path: &Path) -> Result<Vec<AdapterDescriptor>, PassthroughError> {
    let json = fs::read_to_string(path)
        .map_err(|e| PassthroughError::NotFound(format!("failed to read layout {}: {}", path.display(), e)))?;
    let layout: Vec<AdapterDescriptor> = serde_json::from_str(&json)
        .map_err(|e| PassthroughError::InvalidParam(format!("failed to parse layout: {}", e)))?;
    log::debug!("layout {} lists {} adapters", path.display(), layout.len());
    Ok(layout)
}

/// Write an adapter layout as pretty-printed JSON.
pub fn write_adapter_layout(layout: &[AdapterDescriptor], path: &Path) -> Result<(), PassthroughError> {
    let json = serde_json::to_string_pretty(layout)
        .map_err(|e| PassthroughError::Internal(format!("failed to serialize layout: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| PassthroughError::Internal(format!("failed to write layout: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::PortDescriptor;
    use crate::models::port::PortDirection;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}_{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn layout_round_trips_through_file() {
        let path = temp_path("layout");
        let layout = vec![
            AdapterDescriptor::new(
                "primary",
                vec![
                    PortDescriptor::new(0, PortDirection::Out, "AOP"),
                    PortDescriptor::new(1, PortDirection::In, "AIP"),
                ],
            ),
            AdapterDescriptor::new("usb", vec![PortDescriptor::new(0, PortDirection::Both, "USB")]),
        ];

        write_adapter_layout(&layout, &path).unwrap();
        assert_eq!(load_adapter_layout(&path).unwrap(), layout);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn hand_written_layout_parses() {
        let path = temp_path("layout_hand");
        fs::write(
            &path,
            r#"[{ "name": "primary", "ports": [{ "id": 3, "direction": "both", "name": "HDMI" }] }]"#,
        )
        .unwrap();
        let layout = load_adapter_layout(&path).unwrap();
        assert_eq!(layout[0].ports[0].direction, PortDirection::Both);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_and_malformed_files() {
        let path = temp_path("layout_missing");
        assert!(matches!(
            load_adapter_layout(&path),
            Err(PassthroughError::NotFound(_))
        ));

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_adapter_layout(&path),
            Err(PassthroughError::InvalidParam(_))
        ));
        fs::remove_file(&path).ok();
    }
}
