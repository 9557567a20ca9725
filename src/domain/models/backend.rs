use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque per-backend status as reported by its RPC server.
///
/// Known keys include `"document"` (active document name) and
/// `"sketch_count"`, but the core treats the map as free-form.
pub type StatusMap = HashMap<String, serde_json::Value>;

/// The four supported CAD systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    FreeCad,
    Inventor,
    SolidWorks,
    Fusion,
}

/// Default RPC endpoint for a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub host: &'static str,
    pub port: u16,
}

impl Backend {
    pub const ALL: [Backend; 4] = [
        Backend::FreeCad,
        Backend::Inventor,
        Backend::SolidWorks,
        Backend::Fusion,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::FreeCad => "FreeCAD",
            Backend::Inventor => "Inventor",
            Backend::SolidWorks => "SolidWorks",
            Backend::Fusion => "Fusion 360",
        }
    }

    pub fn default_endpoint(&self) -> Endpoint {
        let port = match self {
            Backend::FreeCad => 9876,
            Backend::Inventor => 9877,
            Backend::SolidWorks => 9878,
            Backend::Fusion => 9879,
        };
        Endpoint {
            host: "localhost",
            port,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_backends_enumerable() {
        assert_eq!(Backend::ALL.len(), 4);
    }

    #[test]
    fn test_default_ports_are_distinct() {
        let mut ports: Vec<u16> = Backend::ALL
            .iter()
            .map(|b| b.default_endpoint().port)
            .collect();
        ports.sort_unstable();
        ports.dedup();
        assert_eq!(ports.len(), 4);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Backend::FreeCad.to_string(), "FreeCAD");
        assert_eq!(Backend::Fusion.to_string(), "Fusion 360");
    }
}
