use std::fmt;

/// Identifies one export: `{program}/{project}/{node_label}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataKey {
    pub program: String,
    pub project: String,
    pub node_label: String,
}

impl DataKey {
    pub fn new(program: impl Into<String>, project: impl Into<String>, node_label: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            project: project.into(),
            node_label: node_label.into(),
        }
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.program, self.project, self.node_label)
    }
}
