use itertools::Itertools;
use strum_macros::{Display, EnumString};

use crate::graph::Graph;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EdgeListFormat {
    /// `[('c1', 'c2'), ...]`, as printed by Python for a list of tuples.
    #[default]
    Python,
    /// `[["c1","c2"],...]`
    Json,
}

pub trait ToEdgeList {
    fn to_edge_list(&self, format: EdgeListFormat) -> eyre::Result<String>;
}

impl ToEdgeList for Graph {
    fn to_edge_list(&self, format: EdgeListFormat) -> eyre::Result<String> {
        match format {
            EdgeListFormat::Python => Ok(format!(
                "[{}]",
                self.edges()
                    .map(|(from, to)| format!("({}, {})", python_repr(from), python_repr(to)))
                    .join(", ")
            )),
            EdgeListFormat::Json => Ok(serde_json::to_string(&self.edges().collect_vec())?),
        }
    }
}

// repr() of a Python str
fn python_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut result = String::with_capacity(value.len() + 2);
    result.push(quote);
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c == quote => {
                result.push('\\');
                result.push(c);
            }
            c if c.is_control() => result.push_str(&format!("\\x{:02x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push(quote);
    result
}
