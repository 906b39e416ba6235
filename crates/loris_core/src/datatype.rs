use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int64,
    Float64,
    Utf8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DataType::*;
        match self {
            Bool => write!(f, "BOOL"),
            Int64 => write!(f, "INT64"),
            Float64 => write!(f, "FLOAT64"),
            Utf8 => write!(f, "UTF8"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(DataType::Utf8.to_string(), "UTF8");
        assert_eq!(DataType::Int64.to_string(), "INT64");
    }
}
