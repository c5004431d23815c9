//! Named parameter values handed to [`crate::build`].

use crate::catalog::ParamKind;
use crate::enums::{DelaunayTrianglesOutput, EndCap, Join, Side, SpatialType};

/// One parameter value. `G` is the geometry operand type, used only by
/// geometry-valued parameters such as `extend_to`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue<G> {
    Int(i32),
    Float(f64),
    Bool(bool),
    Text(String),
    EndCap(EndCap),
    Join(Join),
    Side(Side),
    DelaunayOutput(DelaunayTrianglesOutput),
    SpatialType(SpatialType),
    Geometry(G),
}

impl<G> ParamValue<G> {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Text(_) => ParamKind::Text,
            ParamValue::EndCap(_) => ParamKind::EndCap,
            ParamValue::Join(_) => ParamKind::Join,
            ParamValue::Side(_) => ParamKind::Side,
            ParamValue::DelaunayOutput(_) => ParamKind::DelaunayOutput,
            ParamValue::SpatialType(_) => ParamKind::SpatialType,
            ParamValue::Geometry(_) => ParamKind::Geometry,
        }
    }

    /// Whether this value may be bound to a parameter declared as `kind`.
    /// Integers widen to floats, and text is accepted for an enum kind when
    /// it is one of the enum's wire values.
    pub fn fits(&self, kind: ParamKind) -> bool {
        if self.kind() == kind {
            return true;
        }
        match (self, kind) {
            (ParamValue::Int(_), ParamKind::Float) => true,
            (ParamValue::Text(s), ParamKind::EndCap) => s.parse::<EndCap>().is_ok(),
            (ParamValue::Text(s), ParamKind::Join) => s.parse::<Join>().is_ok(),
            (ParamValue::Text(s), ParamKind::Side) => s.parse::<Side>().is_ok(),
            (ParamValue::Text(s), ParamKind::SpatialType) => s.parse::<SpatialType>().is_ok(),
            _ => false,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl<G> From<$ty> for ParamValue<G> {
                fn from(value: $ty) -> Self {
                    ParamValue::$variant(value)
                }
            }
        )+
    };
}

impl_from_value! {
    i32 => Int,
    f64 => Float,
    bool => Bool,
    String => Text,
    EndCap => EndCap,
    Join => Join,
    Side => Side,
    DelaunayTrianglesOutput => DelaunayOutput,
    SpatialType => SpatialType,
}

impl<G> From<&str> for ParamValue<G> {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Insertion-ordered set of named parameters.
///
/// ```
/// use pgspatial_core::{EndCap, GeometryArgument, Params};
///
/// let params: Params<GeometryArgument> = Params::new()
///     .set("radius", 5.0)
///     .set("style_endcap", EndCap::Round);
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Params<G> {
    entries: Vec<(String, ParamValue<G>)>,
}

impl<G> Default for Params<G> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<G> Params<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any earlier value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<ParamValue<G>>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name` only when `value` is `Some`.
    pub fn set_opt<V>(self, name: impl Into<String>, value: Option<V>) -> Self
    where
        V: Into<ParamValue<G>>,
    {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }

    /// Set a geometry-valued parameter.
    pub fn geometry(self, name: impl Into<String>, geometry: G) -> Self {
        self.set(name, ParamValue::Geometry(geometry))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue<G>>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue<G>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Remove `name` and return its value.
    pub fn take(&mut self, name: &str) -> Option<ParamValue<G>> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }
}
