use strum_macros::{Display, EnumString};

// Graphviz node shapes. Names are matched exactly, so "Diamond" is not a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum NodeShape {
    #[strum(serialize = "box")]
    BoxShape,
    Polygon,
    Ellipse,
    Oval,
    Circle,
    Point,
    Egg,
    Triangle,
    Plaintext,
    Plain,
    Diamond,
    Trapezium,
    Parallelogram,
    House,
    Pentagon,
    Hexagon,
    Septagon,
    Octagon,
    DoubleCircle,
    DoubleOctagon,
    TripleOctagon,
    InvTriangle,
    InvTrapezium,
    InvHouse,
    #[strum(serialize = "Mdiamond")]
    MDiamond,
    #[strum(serialize = "Msquare")]
    MSquare,
    #[strum(serialize = "Mcircle")]
    MCircle,
    Rect,
    Rectangle,
    Square,
    Star,
    #[strum(serialize = "none")]
    NoShape,
    Underline,
    Cylinder,
    Note,
    Tab,
    Folder,
    Box3d,
    Component,
    Record,
    #[strum(serialize = "Mrecord")]
    MRecord,
}

impl NodeShape {
    /// Yosys draws wires as diamonds (named) and points (anonymous).
    pub fn is_net(&self) -> bool {
        matches!(self, NodeShape::Diamond | NodeShape::Point)
    }
}
