//! Injected randomness
//!
//! Everything that needs a random number takes a [`UniformSource`] instead of
//! reaching for a global generator, so tests can script exact draws.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed floats in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<T: UniformSource + ?Sized> UniformSource for &mut T {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

impl<T: UniformSource + ?Sized> UniformSource for Box<T> {
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Process-wide thread-local generator. Not cryptographically meaningful.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSource;

impl UniformSource for ThreadSource {
    fn next_uniform(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator for a given seed.
#[derive(Clone, Debug)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl UniformSource for SeededSource {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed sequence of uniforms, cycling when exhausted.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Script that makes [`draw_face`] return exactly `faces_wanted` on a die with `faces` sides.
    pub fn from_faces(faces: u32, faces_wanted: &[u32]) -> Self {
        let faces = f64::from(faces.max(1));
        Self::new(
            faces_wanted
                .iter()
                .map(|&v| (f64::from(v) - 0.5) / faces)
                .collect(),
        )
    }

    /// Number of values handed out so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// A cloneable handle to one generator shared by several consumers on the
/// same thread (sampler, reveal churn, particle spawns).
#[derive(Clone)]
pub struct SharedSource {
    inner: Rc<RefCell<dyn UniformSource>>,
}

impl SharedSource {
    pub fn new<S: UniformSource + 'static>(source: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(source)),
        }
    }
}

impl UniformSource for SharedSource {
    fn next_uniform(&mut self) -> f64 {
        self.inner.borrow_mut().next_uniform()
    }
}

/// Map one uniform draw onto a die face in `[1, faces]`.
pub fn draw_face<S: UniformSource + ?Sized>(source: &mut S, faces: u32) -> u32 {
    let faces = faces.max(1);
    let u = source.next_uniform();
    let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
    let face = (u * f64::from(faces)).floor() as u32 + 1;
    face.min(faces)
}
