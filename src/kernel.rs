//! The geometry kernel boundary.
//!
//! Per spec, parsing and the CSG/B-Rep library are external collaborators.
//! This module expresses the kernel boundary as a trait so the interpreter
//! core never depends on a concrete geometry crate: an embedder plugs in
//! whatever library actually rasterizes `cube`, unions solids, etc.

/// A 3-component vector, used for translate/scale/rotate/mirror arguments
/// and polyhedron/polygon points.
pub type Vec3 = [f64; 3];

/// Which axis (or arbitrary axis vector) a rotation is performed around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotateSpec {
    /// Rotate around Z by a scalar angle in degrees (`rotate(a)`).
    ScalarZ(f64),
    /// Compose X, then Y, then Z rotations (`rotate([ax, ay, az])`).
    Euler(Vec3),
    /// Rotate around an arbitrary axis by an angle in degrees, Rodrigues-style
    /// (`rotate(a, v)`).
    AxisAngle { axis: Vec3, degrees: f64 },
}

/// Parameters accepted by `linear_extrude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearExtrudeSpec {
    pub height: f64,
    pub center: bool,
    pub twist: f64,
    pub slices: u32,
    pub scale: f64,
}

/// The external CSG/B-Rep collaborator.
///
/// Every method returns (or consumes) an opaque `Self::Shape` handle; the
/// interpreter never inspects its contents, only composes calls to this
/// trait in the order SDL specifies. Implementations are expected to be
/// cheap to `Clone` (a reference-counted handle, typically) since the
/// evaluator clones shapes freely while building unions.
pub trait Kernel {
    /// Opaque handle to a 2D sketch or 3D solid.
    type Shape: Clone;

    fn cube(&self, size: Vec3, center: bool) -> Self::Shape;
    fn sphere(&self, r: f64, fn_: u32) -> Self::Shape;
    fn cylinder(&self, h: f64, r1: f64, r2: f64, center: bool, fn_: u32) -> Self::Shape;

    fn square(&self, size: [f64; 2], center: bool) -> Self::Shape;
    fn circle(&self, r: f64, fn_: u32) -> Self::Shape;
    fn polygon(&self, points: &[[f64; 2]], paths: Option<&[Vec<usize>]>) -> Self::Shape;
    fn polyhedron(&self, points: &[Vec3], faces: &[Vec<usize>]) -> Self::Shape;
    fn text(&self, text: &str, size: f64) -> Self::Shape;
    fn import_mesh(&self, path: &str) -> Result<Self::Shape, String>;

    fn translate(&self, shape: &Self::Shape, v: Vec3) -> Self::Shape;
    fn rotate(&self, shape: &Self::Shape, spec: RotateSpec) -> Self::Shape;
    fn scale(&self, shape: &Self::Shape, v: Vec3) -> Self::Shape;
    fn mirror(&self, shape: &Self::Shape, v: Vec3) -> Self::Shape;
    fn color(&self, shape: &Self::Shape, rgba: [f64; 4]) -> Self::Shape;

    fn union(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape;
    fn difference(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape;
    fn intersection(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape;

    fn linear_extrude(&self, sketch: &Self::Shape, spec: LinearExtrudeSpec) -> Self::Shape;
    fn rotate_extrude(&self, sketch: &Self::Shape, angle_degrees: f64) -> Self::Shape;
}
