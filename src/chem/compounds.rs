//! Compound catalogue: hand-picked common compounds plus generated binary ionic halides.

use tracing::debug;

use super::periodic::PeriodicTable;

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
  pub name: String,
  pub formula: String,
}

impl Compound {
  fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
    Self { name: name.into(), formula: formula.into() }
  }
}

const CATIONS: [&str; 9] = ["Li", "Na", "K", "Rb", "Cs", "Mg", "Ca", "Sr", "Ba"];
const ANIONS: [(&str, &str); 4] = [("F", "fluoride"), ("Cl", "chloride"), ("Br", "bromide"), ("I", "iodide")];

fn gcd(mut a: i64, mut b: i64) -> i64 {
  while b != 0 {
    (a, b) = (b, a % b);
  }
  a.abs()
}

fn subscript(count: i64) -> String {
  if count == 1 { String::new() } else { count.to_string() }
}

/// Builds the full catalogue in a stable order.
pub fn catalogue(table: &PeriodicTable) -> Vec<Compound> {
  let common = [
    ("water", "H2O"),
    ("hydrogen peroxide", "H2O2"),
    ("carbon monoxide", "CO"),
    ("carbon dioxide", "CO2"),
    ("oxygen", "O2"),
    ("ozone", "O3"),
    ("nitrogen", "N2"),
    ("ammonia", "NH3"),
    ("silicon dioxide", "SiO2"),
    ("aluminum oxide", "Al2O3"),
    ("benzene", "C6H6"),
  ];
  let mut out: Vec<Compound> = common.iter().map(|(n, f)| Compound::new(*n, *f)).collect();

  let mut ionic: Vec<Compound> = [
    ("sodium chloride", "NaCl"),
    ("sodium bicarbonate", "NaHCO3"),
    ("calcium carbonate", "CaCO3"),
    ("magnesium sulfate", "MgSO4"),
    ("potassium iodide", "KI"),
    ("calcium chloride", "CaCl2"),
    ("sodium nitrate", "NaNO3"),
    ("potassium nitrate", "KNO3"),
    ("ammonium chloride", "NH4Cl"),
    ("sodium sulfate", "Na2SO4"),
    ("silver nitrate", "AgNO3"),
    ("zinc oxide", "ZnO"),
    ("hydrogen cyanide", "HCN"),
    ("sodium hypochlorite", "NaClO"),
    ("calcium sulfate", "CaSO4"),
  ]
  .iter()
  .map(|(n, f)| Compound::new(*n, *f))
  .collect();

  for cation in CATIONS.iter().filter_map(|s| table.by_symbol(s)) {
    for (anion_sym, anion_name) in ANIONS {
      let Some(anion) = table.by_symbol(anion_sym) else { continue };
      let (c, a) = (cation.charge as i64, anion.charge as i64);
      let d = gcd(c, a);
      let formula = format!("{}{}{}{}", cation.sym, subscript(a.abs() / d), anion.sym, subscript(c.abs() / d));
      if ionic.iter().any(|existing| existing.formula == formula) {
        debug!(target: "template", %formula, "Skipping generated compound already in catalogue");
        continue;
      }
      let name = format!("{} {}", cation.name.to_lowercase(), anion_name);
      ionic.push(Compound::new(name, formula));
    }
  }
  out.append(&mut ionic);

  let acids = [
    ("hydrochloric acid", "HCl"),
    ("hydrobromic acid", "HBr"),
    ("hydroiodic acid", "HI"),
    ("perchloric acid", "HClO4"),
    ("nitric acid", "HNO3"),
    ("sulfuric acid", "H2SO4"),
  ];
  out.extend(acids.iter().map(|(n, f)| Compound::new(*n, *f)));

  let bases = [
    ("lithium hydroxide", "LiOH"),
    ("sodium hydroxide", "NaOH"),
    ("potassium hydroxide", "KOH"),
    ("calcium hydroxide", "Ca(OH)2"),
    ("strontium hydroxide", "Sr(OH)2"),
    ("barium hydroxide", "Ba(OH)2"),
  ];
  out.extend(bases.iter().map(|(n, f)| Compound::new(*n, *f)));

  let alkanes = [
    ("methane", "CH4"),
    ("ethane", "C2H6"),
    ("propane", "C3H8"),
    ("butane", "C4H10"),
    ("pentane", "C5H12"),
    ("hexane", "C6H14"),
    ("heptane", "C7H16"),
    ("octane", "C8H18"),
    ("nonane", "C9H20"),
    ("decane", "C10H22"),
  ];
  out.extend(alkanes.iter().map(|(n, f)| Compound::new(*n, *f)));

  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generated_halides_use_charge_ratio() {
    let all = catalogue(&PeriodicTable::default());
    let find = |f: &str| all.iter().find(|c| c.formula == f).map(|c| c.name.clone());
    assert_eq!(find("LiF").as_deref(), Some("lithium fluoride"));
    assert_eq!(find("MgCl2").as_deref(), Some("magnesium chloride"));
    assert_eq!(find("BaI2").as_deref(), Some("barium iodide"));
  }

  #[test]
  fn existing_formulas_are_not_duplicated() {
    let all = catalogue(&PeriodicTable::default());
    for formula in ["NaCl", "KI", "CaCl2"] {
      assert_eq!(all.iter().filter(|c| c.formula == formula).count(), 1, "{formula}");
    }
    // 11 covalent + 15 ionic + 33 generated + 6 acids + 6 bases + 10 alkanes
    assert_eq!(all.len(), 81);
  }
}
