use itertools::Itertools;

use super::{builder::DotGraph, Attributes, Graph, GraphNode};

pub struct GraphvizBuilder<'a> {
    graph: &'a Graph,
    attributes: Option<&'a Attributes>,
}

impl<'a> GraphvizBuilder<'a> {
    pub fn new(g: &'a Graph) -> Self {
        Self {
            graph: g,
            attributes: None,
        }
    }

    pub fn with_attributes(&mut self, attributes: &'a Attributes) -> &mut Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn build(&self, graph_name: &str) -> String {
        format!(
            "digraph {} {{\n{}{}{}}}\n",
            quote(graph_name),
            self.print_attributes(),
            self.print_nodes(),
            self.print_edges(),
        )
    }

    fn print_attributes(&self) -> String {
        let Some(attributes) = self.attributes else {
            return String::new();
        };

        attributes
            .iter()
            .map(|(key, value)| format!("    {}={};\n", quote(key), quote(value)))
            .collect()
    }

    fn print_nodes(&self) -> String {
        self.graph.nodes().map(Self::print_node).collect()
    }

    fn print_node(node: &GraphNode) -> String {
        if node.attributes().is_empty() {
            return format!("    {};\n", quote(node.id()));
        }

        format!(
            "    {} [{}];\n",
            quote(node.id()),
            node.attributes()
                .iter()
                .map(|(key, value)| format!("{}={}", quote(key), quote(value)))
                .join(", ")
        )
    }

    fn print_edges(&self) -> String {
        self.graph
            .edges()
            .map(|(from, to)| format!("    {} -> {};\n", quote(from), quote(to)))
            .collect()
    }
}

// backslashes are left alone so label escapes like `\n` survive
fn quote(value: &str) -> String {
    let mut quoted = value.replace('"', "\\\"");
    // a final `\` would escape the closing quote, so follow it with a line
    // continuation
    if quoted.ends_with('\\') {
        quoted.push_str("\\\n");
    }
    format!("\"{quoted}\"")
}

pub trait ToGraphviz {
    fn to_graphviz(&self) -> String;
}

impl ToGraphviz for Graph {
    fn to_graphviz(&self) -> String {
        GraphvizBuilder::new(self).build("netgraph")
    }
}

impl ToGraphviz for DotGraph {
    fn to_graphviz(&self) -> String {
        GraphvizBuilder::new(&self.graph)
            .with_attributes(&self.attributes)
            .build(self.name.as_deref().unwrap_or("netgraph"))
    }
}
