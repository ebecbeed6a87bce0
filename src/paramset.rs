use std::fmt::Debug;

#[derive(Debug, Clone)]
struct ParamSetItem<T: Debug> {
    name: String,
    values: Vec<T>,
    looked_up: bool,
}

macro_rules! find_one(
    ($x:ident, $y:ident, $t:ty) => (
        pub fn $x(&mut self, name: &str, d: $t) -> $t {
            let mut res = self.$y.iter_mut().find(|e| e.name == name);

            if let Some(e) = res.as_mut() {
                e.looked_up = true;
            }

            res.map(|e| e.values[0].clone()).unwrap_or(d)
        }
    );
);

macro_rules! find(
    ($x:ident, $y:ident, $t:ty) => (
        pub fn $x(&mut self, name: &str) -> Option<Vec<$t>> {
            let mut res = self.$y.iter_mut().find(|e| e.name == name);

            if let Some(e) = res.as_mut() {
                e.looked_up = true;
            }

            res.map(|e| e.values.clone())
        }
    );
);

macro_rules! add(
    ($x:ident, $y:ident, $t:ty) => (
        pub fn $x(&mut self, name: &str, values: Vec<$t>) {
            self.$y
                .push(ParamSetItem {
                          name: name.to_owned(),
                          values: values,
                          looked_up: false,
                      });
        }
    );
);

/// Bag of named configuration values handed in by the front-end.
///
/// Lookups record which parameters were consumed so that typos in a
/// configuration can be reported with `report_unused()`.
#[derive(Default, Debug, Clone)]
pub struct ParamSet {
    bools: Vec<ParamSetItem<bool>>,
    ints: Vec<ParamSetItem<i32>>,
    floats: Vec<ParamSetItem<f32>>,
    strings: Vec<ParamSetItem<String>>,
}

impl ParamSet {
    find_one!(find_one_bool, bools, bool);
    find_one!(find_one_int, ints, i32);
    find_one!(find_one_float, floats, f32);
    find_one!(find_one_string, strings, String);

    find!(find_int, ints, i32);
    find!(find_float, floats, f32);

    add!(add_bool, bools, bool);
    add!(add_int, ints, i32);
    add!(add_float, floats, f32);
    add!(add_string, strings, String);

    /// Warn about every parameter that was added but never looked up.
    /// Returns true if all parameters were consumed.
    pub fn report_unused(&self) -> bool {
        let mut all_used = true;
        for name in self.unused_names() {
            warn!("parameter \"{}\" was never used", name);
            all_used = false;
        }
        all_used
    }

    fn unused_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        names.extend(self.bools.iter().filter(|e| !e.looked_up).map(|e| e.name.as_str()));
        names.extend(self.ints.iter().filter(|e| !e.looked_up).map(|e| e.name.as_str()));
        names.extend(self.floats.iter().filter(|e| !e.looked_up).map(|e| e.name.as_str()));
        names.extend(self.strings.iter().filter(|e| !e.looked_up).map(|e| e.name.as_str()));
        names
    }
}
