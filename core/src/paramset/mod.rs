//! Parameter Sets

use crate::geometry::*;
use crate::math::*;
use crate::spectrum::*;
use std::collections::HashMap;
use std::fmt;

mod paramset_item;

// Re-export
pub use paramset_item::*;

/// A hashmap of parameter sets stored by name.
pub type ParamSetMap<T> = HashMap<String, ParamSetItem<T>>;

/// Stores parameter set items of different types in hashmaps. Components
/// read their configuration from it through the typed `find_one_*` lookups.
#[derive(Clone, Debug, Default)]
pub struct ParamSet {
    pub bools: ParamSetMap<bool>,
    pub ints: ParamSetMap<Int>,
    pub floats: ParamSetMap<Float>,
    pub point3fs: ParamSetMap<Point3f>,
    pub spectra: ParamSetMap<Spectrum>,
    pub strings: ParamSetMap<String>,
}

/// Define a macro that can be used to generate a function for adding/replacing
/// parameter set item.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&mut self, name: &str, values: &[$t]) {
            let n = String::from(name);
            self.$paramset.insert(n, ParamSetItem::new(values.to_vec()));
        }
    };
}

/// Define a macro that can be used to generate a function for removing
/// parameter set item.
macro_rules! paramset_erase {
    ($func: ident, $paramset: ident) => {
        pub fn $func(&mut self, name: &str) -> bool {
            self.$paramset.remove(name).is_some()
        }
    };
}

/// Define a macro that can be used to generate a function for finding
/// parameter set item that is stored as a single item.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            match self.$paramset.get(name) {
                Some(param) if param.values.len() == 1 => param.values[0].clone(),
                _ => default,
            }
        }
    };
}

/// Define a macro that can be used to generate a function for finding
/// parameter set item that is stored as a list.
macro_rules! paramset_find {
    ($func: ident, $t: ty, $paramset: ident) => {
        pub fn $func(&self, name: &str) -> Vec<$t> {
            match self.$paramset.get(name) {
                Some(param) => param.values.clone(),
                None => vec![],
            }
        }
    };
}

/// Define a macro that can be used to print parameter set items.
macro_rules! display_param {
    ($params: expr, $param_type: literal, $formatter: expr) => {
        let mut names: Vec<&String> = $params.keys().collect();
        names.sort();
        for name in names {
            let param = &$params[name];
            write!($formatter, "\"{} {}\" [", $param_type, name)?;
            for (i, v) in param.values.iter().enumerate() {
                if i > 0 {
                    write!($formatter, " ")?;
                }
                write!($formatter, "{}", v)?;
            }
            writeln!($formatter, "]")?;
        }
    };
}

impl ParamSet {
    /// Returns a new `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    paramset_erase!(erase_int, ints);
    paramset_find_one!(find_one_int, Int, ints);
    paramset_find!(find_int, Int, ints);
    paramset_add!(add_int, Int, ints);

    paramset_erase!(erase_bool, bools);
    paramset_find_one!(find_one_bool, bool, bools);
    paramset_find!(find_bool, bool, bools);
    paramset_add!(add_bool, bool, bools);

    paramset_erase!(erase_float, floats);
    paramset_find_one!(find_one_float, Float, floats);
    paramset_find!(find_float, Float, floats);
    paramset_add!(add_float, Float, floats);

    paramset_erase!(erase_point3f, point3fs);
    paramset_find_one!(find_one_point3f, Point3f, point3fs);
    paramset_find!(find_point3f, Point3f, point3fs);
    paramset_add!(add_point3f, Point3f, point3fs);

    paramset_erase!(erase_string, strings);
    paramset_find_one!(find_one_string, String, strings);
    paramset_find!(find_string, String, strings);
    paramset_add!(add_string, String, strings);

    paramset_erase!(erase_spectrum, spectra);
    paramset_find_one!(find_one_spectrum, Spectrum, spectra);
    paramset_find!(find_spectrum, Spectrum, spectra);
    paramset_add!(add_spectrum, Spectrum, spectra);

    /// Add/replace an RGB spectrum.
    ///
    /// * `name`   - Parameter name.
    /// * `values` - RGB values in a linear slice.
    pub fn add_rgb_spectrum(&mut self, name: &str, values: &[Float]) -> Result<(), String> {
        let n = values.len();
        if n % 3 != 0 {
            return Err(format!("RGB spectrum '{}' has {} values, not a multiple of 3", name, n));
        }

        self.spectra.insert(
            String::from(name),
            ParamSetItem::new(
                values
                    .chunks(3)
                    .map(|c| Spectrum::from_rgb(c[0], c[1], c[2]))
                    .collect(),
            ),
        );
        Ok(())
    }

    /// Parse a `key=value` pair and add it with the type inferred from the
    /// value: `true`/`false` are bools, integers are ints, other numbers are
    /// floats, three comma separated numbers are an RGB spectrum and anything
    /// else is a string.
    ///
    /// * `pair` - The `key=value` text.
    pub fn add_from_str(&mut self, pair: &str) -> Result<(), String> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("Parameter '{}' is not of the form key=value", pair))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            return Err(format!("Parameter '{}' has an empty key", pair));
        }

        if let Ok(b) = value.parse::<bool>() {
            self.add_bool(key, &[b]);
        } else if let Ok(i) = value.parse::<Int>() {
            self.add_int(key, &[i]);
        } else if let Ok(f) = value.parse::<Float>() {
            self.add_float(key, &[f]);
        } else if value.contains(',') {
            let rgb = value
                .split(',')
                .map(|v| v.trim().parse::<Float>())
                .collect::<Result<Vec<Float>, _>>()
                .map_err(|e| format!("Parameter '{}': invalid number list. {}", key, e))?;
            self.add_rgb_spectrum(key, &rgb)?;
        } else {
            self.add_string(key, &[value.to_string()]);
        }
        Ok(())
    }

    /// Returns a float parameter, accepting an integer value as well.
    ///
    /// * `name`    - Parameter name.
    /// * `default` - Default value.
    pub fn find_one_number(&self, name: &str, default: Float) -> Float {
        match self.ints.get(name) {
            Some(param) if param.values.len() == 1 => param.values[0] as Float,
            _ => self.find_one_float(name, default),
        }
    }

    /// Clear all parameter set items.
    pub fn clear(&mut self) {
        self.bools.clear();
        self.ints.clear();
        self.floats.clear();
        self.point3fs.clear();
        self.spectra.clear();
        self.strings.clear();
    }
}

impl fmt::Display for ParamSet {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_param!(self.bools, "bool", f);
        display_param!(self.ints, "integer", f);
        display_param!(self.floats, "float", f);
        display_param!(self.point3fs, "point3", f);
        display_param!(self.spectra, "color", f);
        display_param!(self.strings, "string", f);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_one_returns_default_when_missing() {
        let ps = ParamSet::new();
        assert_eq!(ps.find_one_int("max_photons", 1000), 1000);
        assert_eq!(ps.find_one_string("photonmap", String::from("kdtree")), "kdtree");
    }

    #[test]
    fn find_one_ignores_lists() {
        let mut ps = ParamSet::new();
        ps.add_int("n", &[1, 2]);
        assert_eq!(ps.find_one_int("n", 5), 5);
        assert_eq!(ps.find_int("n"), vec![1, 2]);
        assert!(ps.erase_int("n"));
        assert!(!ps.erase_int("n"));
    }

    #[test]
    fn add_from_str_infers_types() {
        let mut ps = ParamSet::new();
        ps.add_from_str("finalgather=true").unwrap();
        ps.add_from_str("max_photons = 500").unwrap();
        ps.add_from_str("render_time=2.5").unwrap();
        ps.add_from_str("photonmap=naive").unwrap();
        ps.add_from_str("albedo=0.5,0.25,1").unwrap();

        assert!(ps.find_one_bool("finalgather", false));
        assert_eq!(ps.find_one_int("max_photons", 0), 500);
        assert_eq!(ps.find_one_float("render_time", -1.0), 2.5);
        assert_eq!(ps.find_one_number("max_photons", 0.0), 500.0);
        assert_eq!(ps.find_one_string("photonmap", String::new()), "naive");
        assert_eq!(
            ps.find_one_spectrum("albedo", Spectrum::ZERO),
            Spectrum::from_rgb(0.5, 0.25, 1.0)
        );
    }

    #[test]
    fn add_from_str_rejects_malformed() {
        let mut ps = ParamSet::new();
        assert!(ps.add_from_str("novalue").is_err());
        assert!(ps.add_from_str("=3").is_err());
        assert!(ps.add_from_str("c=1,2").is_err());
        assert!(ps.add_from_str("c=1,x,3").is_err());
    }

    #[test]
    fn display_lists_params() {
        let mut ps = ParamSet::new();
        ps.add_int("maxnodeprims", &[4]);
        ps.add_string("splitmethod", &[String::from("sah")]);
        let s = format!("{}", ps);
        assert!(s.contains("\"integer maxnodeprims\" [4]"));
        assert!(s.contains("\"string splitmethod\" [sah]"));
    }
}
