use std::str::FromStr;

use rand::Rng;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    Integer,
    Continuous,
}

/// A template variable declared as `name_min_max[_modifier]*`.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomVariable {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub mode: SampleMode,
}

impl RandomVariable {
    /// Uniform sample from the declared range. Integer variables cover every
    /// whole number in `[min, max]` inclusive.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self.mode {
            SampleMode::Integer => {
                let v = rng.gen_range(self.min..self.max + 1.0).floor();
                v.min(self.max.floor())
            }
            SampleMode::Continuous if self.min == self.max => self.min,
            SampleMode::Continuous => rng.gen_range(self.min..self.max),
        }
    }
}

impl FromStr for RandomVariable {
    type Err = String;

    fn from_str(decl: &str) -> Result<Self, Self::Err> {
        let decl = decl.trim();
        let mut parts = decl.split('_');
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(format!("variable `{decl}` has no name"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(format!("`{name}` is not a valid variable name"));
        }

        let mut bound = |which: &str| -> Result<f64, String> {
            let raw = parts.next().ok_or_else(|| format!("variable `{decl}` is missing its {which} bound"))?;
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("variable `{decl}` has a non-numeric {which} bound `{raw}`"))
        };
        let min = bound("lower")?;
        let max = bound("upper")?;
        if min > max {
            return Err(format!("variable `{decl}` has min {min} greater than max {max}"));
        }

        let mut mode = SampleMode::Continuous;
        for modifier in parts {
            match modifier {
                "floor" => mode = SampleMode::Integer,
                other => warn!(target: "template", variable = name, modifier = other, "ignoring unknown variable modifier"),
            }
        }

        // Sampling draws from `min..max` (or `min..max + 1` for integers); that
        // range must be non-empty with a finite width.
        let high = if mode == SampleMode::Integer { max + 1.0 } else { max };
        if !(high - min).is_finite() || (mode == SampleMode::Integer && min >= high) {
            return Err(format!("variable `{decl}` has a range too wide or too large to sample"));
        }

        Ok(Self { name: name.to_string(), min, max, mode })
    }
}

/// Parses the `;`-separated variable line. `!` declares no variables.
pub fn parse_variables(line: &str) -> Result<Vec<RandomVariable>, String> {
    let line = line.trim();
    if line == "!" {
        return Ok(Vec::new());
    }

    let mut vars: Vec<RandomVariable> = Vec::new();
    for decl in line.split(';').map(str::trim).filter(|d| !d.is_empty()) {
        let var: RandomVariable = decl.parse()?;
        if vars.iter().any(|v| v.name == var.name) {
            return Err(format!("variable `{}` is declared twice", var.name));
        }
        vars.push(var);
    }
    Ok(vars)
}
