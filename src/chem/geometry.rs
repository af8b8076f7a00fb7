//! VSEPR lookups: steric number + lone pairs -> shape name -> bond angles.

/// Returned by [`shape`] for combinations with no named geometry.
pub const NO_SUCH_SHAPE: &str = "doesn't exist";

/// Every shape name [`shape`] can return, in the order templates index them.
pub const SHAPES: [&str; 11] = [
  "linear",
  "trigonal planar",
  "bent",
  "tetrahedral",
  "trigonal pyramid",
  "trigonal bipyramid",
  "seesaw",
  "t-shape",
  "octahedral",
  "square pyramid",
  "square planar",
];

/// Molecular shape for a steric number and lone-pair count.
///
/// Total over all inputs: anything outside the table is [`NO_SUCH_SHAPE`].
pub fn shape(steric: i64, lone_pairs: i64) -> &'static str {
  match (steric, lone_pairs) {
    (1 | 2, _) => "linear",
    (3, 0) => "trigonal planar",
    (3, 1) => "bent",
    (3, 2) => "linear",
    (4, 0) => "tetrahedral",
    (4, 1) => "trigonal pyramid",
    (4, 2) => "bent",
    (4, 3) => "linear",
    (5, 0) => "trigonal bipyramid",
    (5, 1) => "seesaw",
    (5, 2) => "t-shape",
    (5, 3 | 4) => "linear",
    (6, 0) => "octahedral",
    (6, 1) => "square pyramid",
    (6, 2) => "square planar",
    (6, 3) => "t-shape",
    (6, 4 | 5) => "linear",
    _ => NO_SUCH_SHAPE,
  }
}

/// Canonical bond angle(s) for a shape name; empty for unknown names.
pub fn bond_angles(shape: &str) -> &'static [&'static str] {
  match shape {
    "linear" => &["180"],
    "trigonal planar" => &["120"],
    "bent" => &["<120"],
    "tetrahedral" => &["109.5"],
    "trigonal pyramid" => &["<109.5"],
    "trigonal bipyramid" => &["90", "120"],
    "seesaw" => &["<90", "<120"],
    "t-shape" => &["<90"],
    "octahedral" => &["90"],
    "square pyramid" => &["<90"],
    "square planar" => &["90"],
    _ => &[],
  }
}

/// Checks a comma-separated angle answer; two-angle shapes accept either order.
pub fn check_bond_angles(input: &str, shape: &str) -> bool {
  let given: Vec<&str> = input.split(',').map(str::trim).collect();
  match bond_angles(shape) {
    [a, b] => given.len() == 2 && ((given[0] == *a && given[1] == *b) || (given[0] == *b && given[1] == *a)),
    [a] => given.len() == 1 && given[0] == *a,
    _ => false,
  }
}

/// Case-insensitive match of `input` against any accepted answer.
pub fn check_any<S: AsRef<str>>(input: &str, accepted: &[S]) -> bool {
  let input = input.trim().to_lowercase();
  accepted.iter().any(|a| a.as_ref().trim().to_lowercase() == input)
}
