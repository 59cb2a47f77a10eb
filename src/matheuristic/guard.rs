//! Scoped ownership of model bounds.

use crate::model::EdgeModel;
use crate::tour::EdgeIndex;

/// Exclusive bound-mutation rights over an [`EdgeModel`].
///
/// Fixing and forbidding go through the session. When the session is
/// dropped (on success, on a solver error or on a panic unwind) every
/// variable it changed gets back the bounds it had before. Bounds set by
/// the caller ahead of the session are left alone.
///
/// ```
/// use u_tsp::instance::Instance;
/// use u_tsp::matheuristic::BoundSession;
/// use u_tsp::model::EdgeModel;
///
/// let instance = Instance::from_fn(5, |i, j| (i + j) as f64).unwrap();
/// let mut model = EdgeModel::new(&instance);
/// {
///     let mut session = BoundSession::new(&mut model);
///     session.fix(0, 1);
///     session.forbid(2, 3);
///     assert_eq!(session.fixed_count(), 1);
/// }
/// assert!((0..model.variable_count()).all(|p| model.is_free(p)));
/// ```
#[derive(Debug)]
pub struct BoundSession<'m> {
    model: &'m mut EdgeModel,
    /// Changed positions with their bounds before the change.
    touched: Vec<(usize, (f64, f64))>,
    fixed: usize,
    forbidden: usize,
}

impl<'m> BoundSession<'m> {
    pub fn new(model: &'m mut EdgeModel) -> Self {
        Self {
            model,
            touched: Vec::new(),
            fixed: 0,
            forbidden: 0,
        }
    }

    pub fn index(&self) -> EdgeIndex {
        self.model.index()
    }

    /// Read access to the model under the current bounds.
    pub fn model(&self) -> &EdgeModel {
        &*self.model
    }

    /// Mutable access for solving; cuts added through it persist after the
    /// session ends.
    pub fn model_mut(&mut self) -> &mut EdgeModel {
        &mut *self.model
    }

    /// Forces edge `{i, j}` to 1.
    pub fn fix(&mut self, i: usize, j: usize) {
        let p = self.model.index().position(i, j);
        self.fix_position(p);
    }

    pub fn fix_position(&mut self, p: usize) {
        if !self.model.is_fixed_one(p) {
            self.touched.push((p, self.model.bounds(p)));
            self.model.set_lower(p, 1.0);
            self.fixed += 1;
        }
    }

    /// Forces edge `{i, j}` to 0.
    pub fn forbid(&mut self, i: usize, j: usize) {
        let p = self.model.index().position(i, j);
        self.forbid_position(p);
    }

    pub fn forbid_position(&mut self, p: usize) {
        if !self.model.is_forbidden(p) {
            self.touched.push((p, self.model.bounds(p)));
            self.model.set_upper(p, 0.0);
            self.forbidden += 1;
        }
    }

    /// Edges forced to 1 through this session.
    pub fn fixed_count(&self) -> usize {
        self.fixed
    }

    /// Edges forced to 0 through this session.
    pub fn forbidden_count(&self) -> usize {
        self.forbidden
    }

    /// Ends the session now.
    pub fn release(self) {}
}

impl Drop for BoundSession<'_> {
    fn drop(&mut self) {
        // Reverse order so a position changed twice ends on its first saved value.
        for &(p, (lower, upper)) in self.touched.iter().rev() {
            self.model.set_lower(p, lower);
            self.model.set_upper(p, upper);
        }
        log::trace!(
            "matheuristic: released bounds fixed={} forbidden={}",
            self.fixed,
            self.forbidden
        );
    }
}
