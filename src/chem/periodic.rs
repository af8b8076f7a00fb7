//! Static periodic table used by the template helpers.
//!
//! Group `-1` marks the lanthanide/actinide placeholders and an
//! electronegativity of `-1.0` means "not measured".

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
  pub num: u32,
  pub sym: &'static str,
  pub name: &'static str,
  pub group: i32,
  pub period: u32,
  pub weight: f64,
  pub eneg: f64,
  /// Typical ionic charge derived from the group; NaN when the group has none.
  pub charge: f64,
}

/// A single field of an [`Element`], as seen from template code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
  Number(f64),
  Text(&'static str),
}

impl Element {
  /// Field names readable through [`Element::field`].
  pub const FIELDS: [&'static str; 8] = ["num", "sym", "name", "group", "period", "weight", "eneg", "charge"];

  pub fn field(&self, name: &str) -> Option<FieldValue> {
    use FieldValue::*;
    Some(match name {
      "num" => Number(self.num as f64),
      "sym" => Text(self.sym),
      "name" => Text(self.name),
      "group" => Number(self.group as f64),
      "period" => Number(self.period as f64),
      "weight" => Number(self.weight),
      "eneg" => Number(self.eneg),
      "charge" => Number(self.charge),
      _ => return None,
    })
  }
}

impl fmt::Display for Element {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.sym)
  }
}

/// Groups {1,2,13,15,16,17,18} carry charges {+1,+2,+3,-3,-2,-1,0}.
pub const fn charge_for_group(group: i32) -> f64 {
  match group {
    1 => 1.0,
    2 => 2.0,
    13 => 3.0,
    15 => -3.0,
    16 => -2.0,
    17 => -1.0,
    18 => 0.0,
    _ => f64::NAN,
  }
}

const fn el(num: u32, sym: &'static str, name: &'static str, group: i32, period: u32, weight: f64, eneg: f64) -> Element {
  Element { num, sym, name, group, period, weight, eneg, charge: charge_for_group(group) }
}

pub static ELEMENTS: [Element; 118] = [
  el(1, "H", "Hydrogen", 1, 1, 1.008, 2.2),
  el(2, "He", "Helium", 18, 1, 4.0026, -1.0),
  el(3, "Li", "Lithium", 1, 2, 6.94, 0.98),
  el(4, "Be", "Beryllium", 2, 2, 9.0122, 1.57),
  el(5, "B", "Boron", 13, 2, 10.81, 2.04),
  el(6, "C", "Carbon", 14, 2, 12.011, 2.55),
  el(7, "N", "Nitrogen", 15, 2, 14.007, 3.04),
  el(8, "O", "Oxygen", 16, 2, 15.999, 3.44),
  el(9, "F", "Fluorine", 17, 2, 18.998, 3.98),
  el(10, "Ne", "Neon", 18, 2, 20.18, -1.0),
  el(11, "Na", "Sodium", 1, 3, 22.99, 0.93),
  el(12, "Mg", "Magnesium", 2, 3, 24.305, 1.31),
  el(13, "Al", "Aluminium", 13, 3, 26.982, 1.61),
  el(14, "Si", "Silicon", 14, 3, 28.085, 1.9),
  el(15, "P", "Phosphorus", 15, 3, 30.974, 2.19),
  el(16, "S", "Sulfur", 16, 3, 32.06, 2.58),
  el(17, "Cl", "Chlorine", 17, 3, 35.45, 3.16),
  el(18, "Ar", "Argon", 18, 3, 39.95, -1.0),
  el(19, "K", "Potassium", 1, 4, 39.098, 0.82),
  el(20, "Ca", "Calcium", 2, 4, 40.078, 1.0),
  el(21, "Sc", "Scandium", 3, 4, 44.956, 1.36),
  el(22, "Ti", "Titanium", 4, 4, 47.867, 1.54),
  el(23, "V", "Vanadium", 5, 4, 50.942, 1.63),
  el(24, "Cr", "Chromium", 6, 4, 51.996, 1.66),
  el(25, "Mn", "Manganese", 7, 4, 54.938, 1.55),
  el(26, "Fe", "Iron", 8, 4, 55.845, 1.83),
  el(27, "Co", "Cobalt", 9, 4, 58.933, 1.88),
  el(28, "Ni", "Nickel", 10, 4, 58.693, 1.91),
  el(29, "Cu", "Copper", 11, 4, 63.546, 1.9),
  el(30, "Zn", "Zinc", 12, 4, 65.38, 1.65),
  el(31, "Ga", "Gallium", 13, 4, 69.723, 1.81),
  el(32, "Ge", "Germanium", 14, 4, 72.63, 2.01),
  el(33, "As", "Arsenic", 15, 4, 74.922, 2.18),
  el(34, "Se", "Selenium", 16, 4, 78.971, 2.55),
  el(35, "Br", "Bromine", 17, 4, 79.904, 2.96),
  el(36, "Kr", "Krypton", 18, 4, 83.798, 3.0),
  el(37, "Rb", "Rubidium", 1, 5, 85.468, 0.82),
  el(38, "Sr", "Strontium", 2, 5, 87.62, 0.95),
  el(39, "Y", "Yttrium", 3, 5, 88.906, 1.22),
  el(40, "Zr", "Zirconium", 4, 5, 91.224, 1.33),
  el(41, "Nb", "Niobium", 5, 5, 92.906, 1.6),
  el(42, "Mo", "Molybdenum", 6, 5, 95.95, 2.16),
  el(43, "Tc", "Technetium", 7, 5, 97.0, 1.9),
  el(44, "Ru", "Ruthenium", 8, 5, 101.07, 2.2),
  el(45, "Rh", "Rhodium", 9, 5, 102.91, 2.28),
  el(46, "Pd", "Palladium", 10, 5, 106.42, 2.2),
  el(47, "Ag", "Silver", 11, 5, 107.87, 1.93),
  el(48, "Cd", "Cadmium", 12, 5, 112.41, 1.69),
  el(49, "In", "Indium", 13, 5, 114.82, 1.78),
  el(50, "Sn", "Tin", 14, 5, 118.71, 1.96),
  el(51, "Sb", "Antimony", 15, 5, 121.76, 2.05),
  el(52, "Te", "Tellurium", 16, 5, 127.6, 2.1),
  el(53, "I", "Iodine", 17, 5, 126.9, 2.66),
  el(54, "Xe", "Xenon", 18, 5, 131.29, 2.6),
  el(55, "Cs", "Caesium", 1, 6, 132.91, 0.79),
  el(56, "Ba", "Barium", 2, 6, 137.33, 0.89),
  el(57, "La", "Lanthanum", -1, 6, 138.91, 1.1),
  el(58, "Ce", "Cerium", -1, 6, 140.12, 1.12),
  el(59, "Pr", "Praseodymium", -1, 6, 140.91, 1.13),
  el(60, "Nd", "Neodymium", -1, 6, 144.24, 1.14),
  el(61, "Pm", "Promethium", -1, 6, 145.0, 1.13),
  el(62, "Sm", "Samarium", -1, 6, 150.36, 1.17),
  el(63, "Eu", "Europium", -1, 6, 151.96, 1.2),
  el(64, "Gd", "Gadolinium", -1, 6, 157.25, 1.2),
  el(65, "Tb", "Terbium", -1, 6, 158.93, 1.2),
  el(66, "Dy", "Dysprosium", -1, 6, 162.5, 1.22),
  el(67, "Ho", "Holmium", -1, 6, 164.93, 1.23),
  el(68, "Er", "Erbium", -1, 6, 167.26, 1.24),
  el(69, "Tm", "Thulium", -1, 6, 168.93, 1.25),
  el(70, "Yb", "Ytterbium", -1, 6, 173.05, 1.1),
  el(71, "Lu", "Lutetium", 3, 6, 174.97, 1.27),
  el(72, "Hf", "Hafnium", 4, 6, 178.49, 1.3),
  el(73, "Ta", "Tantalum", 5, 6, 180.95, 1.5),
  el(74, "W", "Tungsten", 6, 6, 183.84, 2.36),
  el(75, "Re", "Rhenium", 7, 6, 186.21, 1.9),
  el(76, "Os", "Osmium", 8, 6, 190.23, 2.2),
  el(77, "Ir", "Iridium", 9, 6, 192.22, 2.2),
  el(78, "Pt", "Platinum", 10, 6, 195.08, 2.28),
  el(79, "Au", "Gold", 11, 6, 196.97, 2.54),
  el(80, "Hg", "Mercury", 12, 6, 200.59, 2.0),
  el(81, "Tl", "Thallium", 13, 6, 204.38, 1.62),
  el(82, "Pb", "Lead", 14, 6, 207.2, 1.87),
  el(83, "Bi", "Bismuth", 15, 6, 208.98, 2.02),
  el(84, "Po", "Polonium", 16, 6, 209.0, 2.0),
  el(85, "At", "Astatine", 17, 6, 210.0, 2.2),
  el(86, "Rn", "Radon", 18, 6, 222.0, 2.2),
  el(87, "Fr", "Francium", 1, 7, 223.0, 0.79),
  el(88, "Ra", "Radium", 2, 7, 226.0, 0.9),
  el(89, "Ac", "Actinium", -1, 7, 227.0, 1.1),
  el(90, "Th", "Thorium", -1, 7, 232.04, 1.3),
  el(91, "Pa", "Protactinium", -1, 7, 231.04, 1.5),
  el(92, "U", "Uranium", -1, 7, 238.03, 1.38),
  el(93, "Np", "Neptunium", -1, 7, 237.0, 1.36),
  el(94, "Pu", "Plutonium", -1, 7, 244.0, 1.28),
  el(95, "Am", "Americium", -1, 7, 243.0, 1.13),
  el(96, "Cm", "Curium", -1, 7, 247.0, 1.28),
  el(97, "Bk", "Berkelium", -1, 7, 247.0, 1.3),
  el(98, "Cf", "Californium", -1, 7, 251.0, 1.3),
  el(99, "Es", "Einsteinium", -1, 7, 252.0, 1.3),
  el(100, "Fm", "Fermium", -1, 7, 257.0, 1.3),
  el(101, "Md", "Mendelevium", -1, 7, 258.0, 1.3),
  el(102, "No", "Nobelium", -1, 7, 259.0, 1.3),
  el(103, "Lr", "Lawrencium", 3, 7, 266.0, 1.3),
  el(104, "Rf", "Rutherfordium", 4, 7, 267.0, -1.0),
  el(105, "Db", "Dubnium", 5, 7, 268.0, -1.0),
  el(106, "Sg", "Seaborgium", 6, 7, 267.0, -1.0),
  el(107, "Bh", "Bohrium", 7, 7, 270.0, -1.0),
  el(108, "Hs", "Hassium", 8, 7, 271.0, -1.0),
  el(109, "Mt", "Meitnerium", 9, 7, 278.0, -1.0),
  el(110, "Ds", "Darmstadtium", 10, 7, 281.0, -1.0),
  el(111, "Rg", "Roentgenium", 11, 7, 282.0, -1.0),
  el(112, "Cn", "Copernicium", 12, 7, 285.0, -1.0),
  el(113, "Nh", "Nihonium", 13, 7, 286.0, -1.0),
  el(114, "Fl", "Flerovium", 14, 7, 289.0, -1.0),
  el(115, "Mc", "Moscovium", 15, 7, 290.0, -1.0),
  el(116, "Lv", "Livermorium", 16, 7, 293.0, -1.0),
  el(117, "Ts", "Tennessine", 17, 7, 294.0, -1.0),
  el(118, "Og", "Oganesson", 18, 7, 294.0, -1.0),
];

/// Read-only lookup over [`ELEMENTS`].
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTable {
  elements: &'static [Element],
}

impl Default for PeriodicTable {
  fn default() -> Self {
    Self { elements: &ELEMENTS }
  }
}

impl PeriodicTable {
  pub fn elements(&self) -> &'static [Element] {
    self.elements
  }

  pub fn by_number(&self, num: u32) -> Option<&'static Element> {
    self.elements.iter().find(|e| e.num == num)
  }

  #[cfg(test)]
  pub fn by_name(&self, name: &str) -> Option<&'static Element> {
    self.elements.iter().find(|e| e.name.eq_ignore_ascii_case(name))
  }

  pub fn by_symbol(&self, sym: &str) -> Option<&'static Element> {
    self.elements.iter().find(|e| e.sym == sym)
  }

  /// First element satisfying `cond`, in atomic-number order.
  pub fn find(&self, cond: impl Fn(&Element) -> bool) -> Option<&'static Element> {
    self.elements.iter().find(|e| cond(e))
  }

  pub fn filter(&self, cond: impl Fn(&Element) -> bool) -> Vec<&'static Element> {
    self.elements.iter().filter(|e| cond(e)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_is_complete_and_ordered() {
    let table = PeriodicTable::default();
    assert_eq!(table.elements().len(), 118);
    for (i, e) in table.elements().iter().enumerate() {
      assert_eq!(e.num as usize, i + 1);
    }
    assert_eq!(table.by_number(6).map(|e| e.name), Some("Carbon"));
    assert_eq!(table.by_symbol("Og").map(|e| e.num), Some(118));
    assert_eq!(table.by_name("iron").map(|e| e.sym), Some("Fe"));
  }

  #[test]
  fn charges_follow_groups() {
    let table = PeriodicTable::default();
    assert_eq!(table.by_symbol("Na").unwrap().charge, 1.0);
    assert_eq!(table.by_symbol("Mg").unwrap().charge, 2.0);
    assert_eq!(table.by_symbol("Al").unwrap().charge, 3.0);
    assert_eq!(table.by_symbol("N").unwrap().charge, -3.0);
    assert_eq!(table.by_symbol("O").unwrap().charge, -2.0);
    assert_eq!(table.by_symbol("Cl").unwrap().charge, -1.0);
    assert_eq!(table.by_symbol("Ar").unwrap().charge, 0.0);
    assert!(table.by_symbol("Fe").unwrap().charge.is_nan());
    assert!(table.by_symbol("C").unwrap().charge.is_nan());
    assert!(table.by_symbol("U").unwrap().charge.is_nan());
  }

  #[test]
  fn find_returns_first_and_filter_returns_all() {
    let table = PeriodicTable::default();
    let first = table.find(|e| e.period == 3 && e.charge == 2.0).unwrap();
    assert_eq!(first.sym, "Mg");
    let halogens = table.filter(|e| e.group == 17);
    let syms: Vec<_> = halogens.iter().map(|e| e.sym).collect();
    assert_eq!(syms, ["F", "Cl", "Br", "I", "At", "Ts"]);
    assert!(table.find(|e| e.period == 9).is_none());
  }
}
