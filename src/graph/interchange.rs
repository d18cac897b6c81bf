//! JSON and YAML export of a graph.

use serde::Serialize;
use thiserror::Error;

use super::model::{
    Access, Artifact, CompilationUnit, Field, Function, Line, Parameter, TextFile, TypeNode,
};
use super::store::Graph;

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML export failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A borrowed, serializable view of every node kind.
#[derive(Serialize)]
pub struct GraphExport<'g> {
    pub artifacts: &'g [Artifact],
    pub units: &'g [CompilationUnit],
    pub types: &'g [TypeNode],
    pub fields: &'g [Field],
    pub functions: &'g [Function],
    pub parameters: &'g [Parameter],
    pub accesses: &'g [Access],
    pub text_files: &'g [TextFile],
    pub lines: &'g [Line],
}

impl Graph {
    pub fn export(&self) -> GraphExport<'_> {
        GraphExport {
            artifacts: self.artifacts(),
            units: self.units(),
            types: self.types(),
            fields: self.fields(),
            functions: self.functions(),
            parameters: self.parameters(),
            accesses: self.accesses(),
            text_files: self.text_files(),
            lines: self.lines(),
        }
    }
}

pub fn to_json(graph: &Graph) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(&graph.export())?)
}

pub fn to_yaml(graph: &Graph) -> Result<String, InterchangeError> {
    Ok(serde_yaml::to_string(&graph.export())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::QualifiedName;

    #[test]
    fn test_json_export_names_types() {
        let mut graph = Graph::new();
        let app = graph.add_artifact("app", &[]);
        graph.add_type(&QualifiedName::parse("p.A").unwrap(), Some(app));

        let json = to_json(&graph).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["types"][0]["name"], "p.A");
        assert_eq!(value["artifacts"][0]["name"], "app");
    }

    #[test]
    fn test_yaml_export() {
        let mut graph = Graph::new();
        let file = graph.add_text_file("notes.txt");
        graph.add_line(file, "hello").unwrap();

        let yaml = to_yaml(&graph).unwrap();

        assert!(yaml.contains("hello"));
    }
}
