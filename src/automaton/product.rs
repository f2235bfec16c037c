use crate::Show;

/// The index of a state in a product automaton, which is simply a pair of the indices of the
/// states in the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductIndex<L, R>(pub L, pub R);

impl<L: Show, R: Show> Show for ProductIndex<L, R> {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<L, R> From<(L, R)> for ProductIndex<L, R> {
    fn from((l, r): (L, R)) -> Self {
        Self(l, r)
    }
}
