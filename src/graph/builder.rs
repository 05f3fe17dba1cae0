use super::{Attributes, Graph, GraphNodeId};

/// A graph read from DOT text.
#[derive(Debug, Clone, Default, derive_more::Deref)]
pub struct DotGraph {
    pub name: Option<String>,
    // top level `key=value` statements
    pub attributes: Attributes,
    #[deref]
    pub graph: Graph,
}

impl DotGraph {
    pub fn from_dot(text: &str) -> eyre::Result<DotGraph> {
        DotGraphBuilder::new(text).build()
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DotTokenType {
    // bare word or numeral; keywords are bare words
    Ident(String),
    Quoted(String),
    Html(String),
    BraceStart,
    BraceEnd,
    BracketStart,
    BracketEnd,
    Equal,
    Semicolon,
    Comma,
    Colon,
    Arrow,
    Line,
    Eof,
}

impl DotTokenType {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, DotTokenType::Ident(ident) if ident.eq_ignore_ascii_case(keyword))
    }

    fn into_id(self) -> Option<String> {
        match self {
            DotTokenType::Ident(id) | DotTokenType::Quoted(id) | DotTokenType::Html(id) => Some(id),
            _ => None,
        }
    }

    fn is_id(&self) -> bool {
        matches!(
            self,
            DotTokenType::Ident(_) | DotTokenType::Quoted(_) | DotTokenType::Html(_)
        )
    }

    fn is_edge_op(&self) -> bool {
        matches!(self, DotTokenType::Arrow | DotTokenType::Line)
    }
}

/// Reads the DOT subset written by `yosys show` (and most other tools).
///
/// Ports are dropped from node ids, so `c12:p8:w` names node `c12`. Node
/// defaults (`node [..]`) apply to nodes created after them within the same
/// subgraph; edge attributes are ignored because edges carry no payload.
#[derive(Default)]
pub struct DotGraphBuilder {
    stmt: Vec<char>,
    ptr: usize,
    depth: usize,
    node_defaults: Attributes,
    result: DotGraph,
}

impl DotGraphBuilder {
    pub fn new(stmt: &str) -> Self {
        DotGraphBuilder {
            stmt: stmt.chars().collect(),
            ..Default::default()
        }
    }

    pub fn build(mut self) -> eyre::Result<DotGraph> {
        self.parse_graph()?;

        let trailing = self.next()?;
        if trailing != DotTokenType::Eof {
            eyre::bail!("Unexpected {:?} after graph at offset {}", trailing, self.ptr);
        }

        Ok(self.result)
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.stmt.get(self.ptr + offset).copied()
    }

    fn next_ptr(&mut self) -> usize {
        let ptr = self.ptr;
        self.ptr += 1;
        ptr
    }

    fn skip_ws(&mut self) -> eyre::Result<()> {
        loop {
            match (self.peek_char(0), self.peek_char(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.next_ptr();
                }
                (Some('/'), Some('/')) | (Some('#'), _) => {
                    while !matches!(self.peek_char(0), None | Some('\n')) {
                        self.next_ptr();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.ptr;
                    self.ptr += 2;
                    loop {
                        match (self.peek_char(0), self.peek_char(1)) {
                            (Some('*'), Some('/')) => {
                                self.ptr += 2;
                                break;
                            }
                            (Some(_), _) => {
                                self.next_ptr();
                            }
                            (None, _) => eyre::bail!("Unterminated comment at offset {}", start),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next(&mut self) -> eyre::Result<DotTokenType> {
        self.skip_ws()?;

        let start = self.ptr;
        let Some(c) = self.peek_char(0) else {
            return Ok(DotTokenType::Eof);
        };
        self.next_ptr();

        let token = match c {
            '{' => DotTokenType::BraceStart,
            '}' => DotTokenType::BraceEnd,
            '[' => DotTokenType::BracketStart,
            ']' => DotTokenType::BracketEnd,
            '=' => DotTokenType::Equal,
            ';' => DotTokenType::Semicolon,
            ',' => DotTokenType::Comma,
            ':' => DotTokenType::Colon,
            '-' if self.peek_char(0) == Some('>') => {
                self.next_ptr();
                DotTokenType::Arrow
            }
            '-' if self.peek_char(0) == Some('-') => {
                self.next_ptr();
                DotTokenType::Line
            }
            '"' => DotTokenType::Quoted(self.read_quoted(start)?),
            '<' => DotTokenType::Html(self.read_html(start)?),
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let mut result = String::from(c);
                while let Some(c) = self.peek_char(0).filter(|c| c.is_ascii_digit() || *c == '.') {
                    result.push(c);
                    self.next_ptr();
                }
                DotTokenType::Ident(result)
            }
            c if c.is_alphabetic() || c == '_' || !c.is_ascii() => {
                let mut result = String::from(c);
                while let Some(c) = self
                    .peek_char(0)
                    .filter(|c| c.is_alphanumeric() || *c == '_' || !c.is_ascii())
                {
                    result.push(c);
                    self.next_ptr();
                }
                DotTokenType::Ident(result)
            }
            c => eyre::bail!("Unexpected character {:?} at offset {}", c, start),
        };

        Ok(token)
    }

    fn lookup(&mut self) -> eyre::Result<DotTokenType> {
        let cur_ptr = self.ptr;
        let lookup = self.next();
        self.ptr = cur_ptr;
        lookup
    }

    fn expect(&mut self, expected: DotTokenType) -> eyre::Result<()> {
        let start = self.ptr;
        let token = self.next()?;
        if token != expected {
            eyre::bail!("Expected {:?} but found {:?} at offset {}", expected, token, start);
        }
        Ok(())
    }

    fn expect_id(&mut self) -> eyre::Result<String> {
        let start = self.ptr;
        let token = self.next()?;
        match token.into_id() {
            Some(id) => Ok(id),
            None => eyre::bail!("Expected identifier at offset {}", start),
        }
    }

    // `\"` unescapes, `\` + newline joins lines, everything else stays verbatim
    fn read_quoted(&mut self, start: usize) -> eyre::Result<String> {
        let mut result = String::new();

        loop {
            let Some(c) = self.peek_char(0) else {
                eyre::bail!("Unterminated string starting at offset {}", start);
            };
            self.next_ptr();

            match c {
                '"' => break,
                '\\' => match self.peek_char(0) {
                    Some('"') => {
                        result.push('"');
                        self.next_ptr();
                    }
                    Some('\n') => {
                        self.next_ptr();
                    }
                    Some('\r') if self.peek_char(1) == Some('\n') => {
                        self.ptr += 2;
                    }
                    _ => result.push('\\'),
                },
                c => result.push(c),
            }
        }

        // "a" + "b"
        let cur_ptr = self.ptr;
        self.skip_ws()?;
        if self.peek_char(0) == Some('+') {
            self.next_ptr();
            self.skip_ws()?;
            if self.peek_char(0) == Some('"') {
                let start = self.next_ptr();
                result.push_str(&self.read_quoted(start)?);
                return Ok(result);
            }
        }
        self.ptr = cur_ptr;

        Ok(result)
    }

    fn read_html(&mut self, start: usize) -> eyre::Result<String> {
        let mut result = String::new();
        let mut depth = 1;

        loop {
            let Some(c) = self.peek_char(0) else {
                eyre::bail!("Unterminated html string starting at offset {}", start);
            };
            self.next_ptr();

            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            result.push(c);
        }

        Ok(result)
    }

    fn parse_graph(&mut self) -> eyre::Result<()> {
        if self.lookup()?.is_keyword("strict") {
            self.next()?;
        }

        let start = self.ptr;
        let token = self.next()?;
        if !token.is_keyword("digraph") && !token.is_keyword("graph") {
            eyre::bail!("Expected graph header but found {:?} at offset {}", token, start);
        }

        if self.lookup()?.is_id() {
            self.result.name = self.next()?.into_id();
        }

        self.expect(DotTokenType::BraceStart)?;
        self.parse_stmt_list()?;
        self.expect(DotTokenType::BraceEnd)
    }

    fn parse_stmt_list(&mut self) -> eyre::Result<()> {
        loop {
            match self.lookup()? {
                DotTokenType::BraceEnd => return Ok(()),
                DotTokenType::Eof => eyre::bail!("Unexpected end of input, missing closing brace"),
                DotTokenType::Semicolon | DotTokenType::Comma => {
                    self.next()?;
                }
                _ => self.parse_stmt()?,
            }
        }
    }

    fn parse_stmt(&mut self) -> eyre::Result<()> {
        let token = self.lookup()?;

        if token.is_keyword("node") {
            self.next()?;
            let attributes = self.parse_attr_lists()?;
            self.node_defaults.extend(attributes);
            return Ok(());
        }

        if token.is_keyword("graph") {
            self.next()?;
            let attributes = self.parse_attr_lists()?;
            if self.depth == 0 {
                self.result.attributes.extend(attributes);
            }
            return Ok(());
        }

        if token.is_keyword("edge") {
            self.next()?;
            self.parse_attr_lists()?;
            return Ok(());
        }

        if token.is_keyword("subgraph") || token == DotTokenType::BraceStart {
            return self.parse_subgraph();
        }

        let start = self.ptr;
        let Some(id) = self.next()?.into_id() else {
            eyre::bail!("Unexpected {:?} at offset {}", token, start);
        };

        if self.lookup()? == DotTokenType::Equal {
            self.next()?;
            let value = self.expect_id()?;
            if self.depth == 0 {
                self.result.attributes.insert(id, value);
            }
            return Ok(());
        }

        self.skip_port()?;

        if self.lookup()?.is_edge_op() {
            return self.parse_edge_chain(id);
        }

        let attributes = self.parse_attr_lists()?;
        self.declare_node(id, attributes);

        Ok(())
    }

    fn parse_subgraph(&mut self) -> eyre::Result<()> {
        if self.lookup()?.is_keyword("subgraph") {
            self.next()?;
            if self.lookup()?.is_id() {
                self.next()?;
            }
        }

        let defaults = self.node_defaults.clone();
        self.depth += 1;

        self.expect(DotTokenType::BraceStart)?;
        self.parse_stmt_list()?;
        self.expect(DotTokenType::BraceEnd)?;

        self.depth -= 1;
        self.node_defaults = defaults;

        if self.lookup()?.is_edge_op() {
            eyre::bail!("Subgraph edge endpoints are not supported (offset {})", self.ptr);
        }

        Ok(())
    }

    fn parse_edge_chain(&mut self, first: GraphNodeId) -> eyre::Result<()> {
        let mut chain = vec![first];

        while self.lookup()?.is_edge_op() {
            self.next()?;

            if matches!(self.lookup()?, DotTokenType::BraceStart)
                || self.lookup()?.is_keyword("subgraph")
            {
                eyre::bail!("Subgraph edge endpoints are not supported (offset {})", self.ptr);
            }

            chain.push(self.expect_id()?);
            self.skip_port()?;
        }

        // edge attributes carry nothing the graph keeps
        self.parse_attr_lists()?;

        for id in &chain {
            self.declare_node(id.clone(), Attributes::new());
        }
        for (from, to) in chain.iter().zip(chain.iter().skip(1)) {
            self.result.graph.add_edge(from.as_str(), to.as_str());
        }

        Ok(())
    }

    // `:port` and `:port:compass`
    fn skip_port(&mut self) -> eyre::Result<()> {
        for _ in 0..2 {
            if self.lookup()? != DotTokenType::Colon {
                break;
            }
            self.next()?;
            self.expect_id()?;
        }
        Ok(())
    }

    fn parse_attr_lists(&mut self) -> eyre::Result<Attributes> {
        let mut attributes = Attributes::new();

        while self.lookup()? == DotTokenType::BracketStart {
            self.next()?;

            loop {
                match self.lookup()? {
                    DotTokenType::BracketEnd => {
                        self.next()?;
                        break;
                    }
                    DotTokenType::Semicolon | DotTokenType::Comma => {
                        self.next()?;
                    }
                    _ => {
                        let key = self.expect_id()?;
                        let value = if self.lookup()? == DotTokenType::Equal {
                            self.next()?;
                            self.expect_id()?
                        } else {
                            "true".to_string()
                        };
                        attributes.insert(key, value);
                    }
                }
            }
        }

        Ok(attributes)
    }

    fn declare_node(&mut self, id: GraphNodeId, attributes: Attributes) {
        if self.result.graph.contains(&id) {
            self.result.graph.add_node(id, attributes);
            return;
        }

        let mut merged = self.node_defaults.clone();
        merged.extend(attributes);
        self.result.graph.add_node(id, merged);
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::DotGraph;
    use crate::graph::GraphNodeKind;

    const COUNTER_DOT: &str = include_str!("../../fixtures/counter.dot");

    #[test]
    fn unittest_dot_yosys_fixture() -> eyre::Result<()> {
        let g = DotGraph::from_dot(COUNTER_DOT)?;

        assert_eq!(g.name.as_deref(), Some("counter"));
        assert_eq!(g.attributes.get("rankdir").map(String::as_str), Some("LR"));
        assert_eq!(
            g.node_ids().collect_vec(),
            vec!["n1", "n2", "n3", "n4", "n5", "c6", "c7", "c8", "v0"]
        );
        assert_eq!(g.node("n1").unwrap().kind(), GraphNodeKind::Cell);
        assert_eq!(g.node("n4").unwrap().kind(), GraphNodeKind::Net);
        assert_eq!(g.node("n5").unwrap().kind(), GraphNodeKind::Net);
        assert_eq!(g.node("c6").unwrap().kind(), GraphNodeKind::Cell);
        assert_eq!(g.node("v0").unwrap().kind(), GraphNodeKind::Unknown);
        assert_eq!(
            g.node("c6").unwrap().attribute("label"),
            Some("{{<p9> A|<p10> B}|$2\\n$add|{<p11> Y}}")
        );
        assert_eq!(
            g.edges().collect_vec(),
            vec![
                ("n1", "c7"),
                ("n2", "c8"),
                ("n3", "c6"),
                ("n4", "c8"),
                ("n5", "c7"),
                ("c6", "n4"),
                ("c7", "n3"),
                ("c8", "n5"),
                ("v0", "c8"),
            ]
        );

        Ok(())
    }

    #[test]
    fn unittest_dot_edge_chain_and_implicit_nodes() -> eyre::Result<()> {
        let g = DotGraph::from_dot("strict digraph { a -> b -> c [color=red]; b -> a }")?;

        assert_eq!(g.name, None);
        assert_eq!(g.node_ids().collect_vec(), vec!["a", "b", "c"]);
        assert_eq!(
            g.edges().collect_vec(),
            vec![("a", "b"), ("b", "c"), ("b", "a")]
        );
        assert!(g.node("c").unwrap().attributes().is_empty());

        Ok(())
    }

    #[test]
    fn unittest_dot_node_defaults_are_scoped() -> eyre::Result<()> {
        let text = r#"
            digraph g {
                // nets first
                { node [shape=point]; w1; w2 }
                /* cells */
                node [shape="box"]
                c1; c2 [label="x"]
                w1 [color=blue]
                "quoted id" -> c1
            }
        "#;
        let g = DotGraph::from_dot(text)?;

        assert_eq!(g.node("w1").unwrap().kind(), GraphNodeKind::Net);
        assert_eq!(g.node("w1").unwrap().attribute("color"), Some("blue"));
        assert_eq!(g.node("w2").unwrap().kind(), GraphNodeKind::Net);
        assert_eq!(g.node("c2").unwrap().kind(), GraphNodeKind::Cell);
        assert_eq!(g.node("c2").unwrap().attribute("label"), Some("x"));
        assert_eq!(g.node("quoted id").unwrap().kind(), GraphNodeKind::Cell);

        Ok(())
    }

    #[test]
    fn unittest_dot_quoted_escapes() -> eyre::Result<()> {
        let g = DotGraph::from_dot(
            "digraph { a [label=\"say \\\"hi\\\"\\l\", tooltip=\"x\" + \"y\"] }",
        )?;

        let a = g.node("a").unwrap();
        assert_eq!(a.attribute("label"), Some("say \"hi\"\\l"));
        assert_eq!(a.attribute("tooltip"), Some("xy"));

        Ok(())
    }

    #[test]
    fn unittest_dot_errors() {
        assert!(DotGraph::from_dot("digraph { a -> b").is_err());
        assert!(DotGraph::from_dot("digraph { a [label=\"oops] }").is_err());
        assert!(DotGraph::from_dot("digraph { a -> { b c } }").is_err());
        assert!(DotGraph::from_dot("tree { }").is_err());
        assert!(DotGraph::from_dot("digraph { } extra").is_err());
        assert!(DotGraph::from_dot("digraph { /* open").is_err());
    }
}
