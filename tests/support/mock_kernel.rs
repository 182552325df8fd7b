//! A closed-form [`Kernel`] test double.
//!
//! This is deliberately not a real CSG engine: every shape collapses to a
//! single `f64` "measure" (volume for a solid, area for a sketch), and the
//! boolean operators combine measures directly (`a + b`, `(a - b).max(0)`,
//! `a.min(b)`) rather than computing true geometric overlap. That's enough
//! to exercise the interpreter's scoping, lowering and dispatch end to end;
//! it is not enough to reproduce a real kernel's overlap-aware volumes for
//! shapes that interpenetrate without one fully containing the other (see
//! the `difference_of_centered_solids` scenario test for the concrete case
//! this diverges on, and why the asserted number is this kernel's own
//! arithmetic rather than a real engine's).

use std::f64::consts::PI;

use sdl_csg::kernel::{Kernel, LinearExtrudeSpec, RotateSpec, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockShape {
    pub measure: f64,
}

impl MockShape {
    fn new(measure: f64) -> Self {
        Self { measure }
    }
}

pub struct MockKernel;

impl Kernel for MockKernel {
    type Shape = MockShape;

    fn cube(&self, size: Vec3, _center: bool) -> Self::Shape {
        MockShape::new(size[0] * size[1] * size[2])
    }

    fn sphere(&self, r: f64, _fn: u32) -> Self::Shape {
        MockShape::new(4.0 / 3.0 * PI * r.powi(3))
    }

    fn cylinder(&self, h: f64, r1: f64, r2: f64, _center: bool, _fn: u32) -> Self::Shape {
        MockShape::new(h * PI / 3.0 * (r1 * r1 + r1 * r2 + r2 * r2))
    }

    fn square(&self, size: [f64; 2], _center: bool) -> Self::Shape {
        MockShape::new(size[0] * size[1])
    }

    fn circle(&self, r: f64, _fn: u32) -> Self::Shape {
        MockShape::new(PI * r * r)
    }

    fn polygon(&self, points: &[[f64; 2]], _paths: Option<&[Vec<usize>]>) -> Self::Shape {
        // Shoelace formula; ignores `paths` (holes) -- closed-form and good
        // enough for the scenarios it's tested on, not a general triangulator.
        let n = points.len();
        if n < 3 {
            return MockShape::new(0.0);
        }
        let mut twice_area = 0.0;
        for i in 0..n {
            let (x0, y0) = (points[i][0], points[i][1]);
            let next = points[(i + 1) % n];
            let (x1, y1) = (next[0], next[1]);
            twice_area += x0 * y1 - x1 * y0;
        }
        MockShape::new((twice_area / 2.0).abs())
    }

    fn polyhedron(&self, _points: &[Vec3], _faces: &[Vec<usize>]) -> Self::Shape {
        MockShape::new(0.0)
    }

    fn text(&self, text: &str, size: f64) -> Self::Shape {
        MockShape::new(text.chars().count() as f64 * size)
    }

    fn import_mesh(&self, path: &str) -> Result<Self::Shape, String> {
        Err(format!("mock kernel cannot import {path:?}"))
    }

    fn translate(&self, shape: &Self::Shape, _v: Vec3) -> Self::Shape {
        *shape
    }

    fn rotate(&self, shape: &Self::Shape, _spec: RotateSpec) -> Self::Shape {
        *shape
    }

    fn scale(&self, shape: &Self::Shape, v: Vec3) -> Self::Shape {
        MockShape::new(shape.measure * v[0] * v[1] * v[2])
    }

    fn mirror(&self, shape: &Self::Shape, _v: Vec3) -> Self::Shape {
        *shape
    }

    fn color(&self, shape: &Self::Shape, _rgba: [f64; 4]) -> Self::Shape {
        *shape
    }

    fn union(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape {
        MockShape::new(a.measure + b.measure)
    }

    fn difference(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape {
        MockShape::new((a.measure - b.measure).max(0.0))
    }

    fn intersection(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape {
        MockShape::new(a.measure.min(b.measure))
    }

    fn linear_extrude(&self, sketch: &Self::Shape, spec: LinearExtrudeSpec) -> Self::Shape {
        let taper = (1.0 + spec.scale + spec.scale * spec.scale) / 3.0;
        MockShape::new(sketch.measure * spec.height * taper)
    }

    fn rotate_extrude(&self, sketch: &Self::Shape, angle_degrees: f64) -> Self::Shape {
        MockShape::new(sketch.measure * angle_degrees.to_radians())
    }
}
