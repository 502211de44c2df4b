//! Nested lookup tables with linear interpolation.
//!
//! A [`Table`] maps an ordered numeric key to either a leaf value or another
//! table, so one type covers the one-axis airspeed calibration and deviation
//! tables as well as the three-axis (weight, temperature, pressure altitude)
//! performance charts.
//!
//! Lookups select the two rows bracketing the query on each axis and
//! interpolate linearly between them, recursing into nested tables first.
//! Queries outside the key range are extrapolated along the nearest segment.
//! Axes may be periodic (compass headings): keys and queries are reduced
//! modulo the period and the seam between the last and first key is
//! interpolated through the wrap, not back across the table.

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Values that can be linearly interpolated.
pub trait Blend: Clone {
    /// Linear blend from `self` (t = 0) to `other` (t = 1). `t` may fall
    /// outside [0, 1] when extrapolating.
    fn blend(&self, other: &Self, t: f64) -> Self;

    /// Shift a value across a periodic seam. Records of independent
    /// quantities have nothing to shift.
    fn offset(&self, _delta: f64) -> Self {
        self.clone()
    }
}

impl Blend for f64 {
    fn blend(&self, other: &Self, t: f64) -> Self {
        (1.0 - t) * self + t * other
    }

    fn offset(&self, delta: f64) -> Self {
        self + delta
    }
}

/// Periodicity of a table axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wrap {
    /// Key period, e.g. 360 for headings
    pub period: f64,
    /// Amount added to a value each time its key is carried across the seam;
    /// 360 for tables whose values are themselves headings, 0 otherwise
    #[serde(default)]
    pub value_period: f64,
}

impl Wrap {
    pub const fn degrees() -> Self {
        Self {
            period: 360.0,
            value_period: 0.0,
        }
    }

    pub const fn headings() -> Self {
        Self {
            period: 360.0,
            value_period: 360.0,
        }
    }
}

/// A table row's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub enum Cell<T> {
    Nested(Table<T>),
    Value(T),
}

impl<T> Cell<T> {
    fn depth(&self) -> usize {
        match self {
            Cell::Nested(table) => table.depth,
            Cell::Value(_) => 0,
        }
    }
}

/// Serialized form of a table; validated into [`Table`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub struct TableRepr<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<Wrap>,
    pub rows: Vec<(f64, Cell<T>)>,
}

/// An interpolation table over one or more nested axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr<T>", into = "TableRepr<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub struct Table<T> {
    wrap: Option<Wrap>,
    /// Sorted ascending; reduced modulo the period on periodic axes
    keys: Vec<f64>,
    cells: Vec<Cell<T>>,
    depth: usize,
}

#[derive(Debug, Clone, Copy)]
enum Bracket {
    Exact(usize),
    Segment {
        lo: usize,
        hi: usize,
        key_lo: f64,
        key_hi: f64,
        shift_lo: f64,
        shift_hi: f64,
        query: f64,
    },
}

impl<T> Table<T> {
    /// One-axis table from `(key, value)` rows in any order.
    pub fn new(rows: Vec<(f64, T)>) -> Result<Self, TableError> {
        Self::from_cells(
            rows.into_iter()
                .map(|(key, value)| (key, Cell::Value(value)))
                .collect(),
            None,
        )
    }

    /// Outer axis over nested tables, which must all have the same depth.
    pub fn nested(rows: Vec<(f64, Table<T>)>) -> Result<Self, TableError> {
        Self::from_cells(
            rows.into_iter()
                .map(|(key, table)| (key, Cell::Nested(table)))
                .collect(),
            None,
        )
    }

    /// Make the outermost axis periodic.
    pub fn with_wrap(self, wrap: Wrap) -> Result<Self, TableError> {
        let rows = self.keys.into_iter().zip(self.cells).collect();
        Self::from_cells(rows, Some(wrap))
    }

    pub fn from_cells(
        mut rows: Vec<(f64, Cell<T>)>,
        wrap: Option<Wrap>,
    ) -> Result<Self, TableError> {
        let Some(first) = rows.first() else {
            return Err(TableError::Empty);
        };
        let inner_depth = first.1.depth();

        if let Some(wrap) = wrap {
            if !wrap.period.is_finite() || wrap.period <= 0.0 {
                return Err(TableError::InvalidPeriod(wrap.period));
            }
        }

        for (key, cell) in &mut rows {
            if !key.is_finite() {
                return Err(TableError::NonFiniteKey(*key));
            }
            if cell.depth() != inner_depth {
                return Err(TableError::RaggedDepth {
                    expected: inner_depth,
                    found: cell.depth(),
                });
            }
            if let Some(wrap) = wrap {
                *key = reduce(*key, wrap.period);
            }
        }

        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(TableError::DuplicateKey(pair[0].0));
        }

        let (keys, cells) = rows.into_iter().unzip();
        Ok(Self {
            wrap,
            keys,
            cells,
            depth: inner_depth + 1,
        })
    }

    /// Number of nested axes, i.e. the length of a lookup query.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn wrap(&self) -> Option<Wrap> {
        self.wrap
    }

    fn bracket(&self, query: f64) -> Bracket {
        let n = self.keys.len();
        if n == 1 {
            return Bracket::Exact(0);
        }

        match self.wrap {
            None => {
                let idx = self.keys.partition_point(|key| *key <= query);
                if idx > 0 && self.keys[idx - 1] == query {
                    return Bracket::Exact(idx - 1);
                }
                // Out-of-range queries reuse the first or last segment.
                let lo = idx.clamp(1, n - 1) - 1;
                let hi = lo + 1;
                Bracket::Segment {
                    lo,
                    hi,
                    key_lo: self.keys[lo],
                    key_hi: self.keys[hi],
                    shift_lo: 0.0,
                    shift_hi: 0.0,
                    query,
                }
            }
            Some(wrap) => {
                let query = reduce(query, wrap.period);
                let idx = self.keys.partition_point(|key| *key <= query);
                if idx > 0 && self.keys[idx - 1] == query {
                    return Bracket::Exact(idx - 1);
                }
                let lo = (idx + n - 1) % n;
                let hi = idx % n;
                let lo_turns = if idx == 0 { -1.0 } else { 0.0 };
                let hi_turns = if idx == n { 1.0 } else { 0.0 };
                Bracket::Segment {
                    lo,
                    hi,
                    key_lo: self.keys[lo] + lo_turns * wrap.period,
                    key_hi: self.keys[hi] + hi_turns * wrap.period,
                    shift_lo: lo_turns * wrap.value_period,
                    shift_hi: hi_turns * wrap.value_period,
                    query,
                }
            }
        }
    }
}

impl<T: Blend> Table<T> {
    /// Interpolate the table at `query`, one value per axis from the
    /// outermost inward.
    pub fn lookup(&self, query: &[f64]) -> Result<T, TableError> {
        if query.len() != self.depth {
            return Err(TableError::AxisMismatch {
                expected: self.depth,
                given: query.len(),
            });
        }
        self.eval(query)
    }

    fn eval(&self, query: &[f64]) -> Result<T, TableError> {
        let Some((&head, rest)) = query.split_first() else {
            return Err(TableError::AxisMismatch {
                expected: self.depth,
                given: 0,
            });
        };

        match self.bracket(head) {
            Bracket::Exact(idx) => self.cell_value(idx, rest),
            Bracket::Segment {
                lo,
                hi,
                key_lo,
                key_hi,
                shift_lo,
                shift_hi,
                query,
            } => {
                let mut v0 = self.cell_value(lo, rest)?;
                let mut v1 = self.cell_value(hi, rest)?;
                if shift_lo != 0.0 {
                    v0 = v0.offset(shift_lo);
                }
                if shift_hi != 0.0 {
                    v1 = v1.offset(shift_hi);
                }
                let t = (query - key_lo) / (key_hi - key_lo);
                Ok(v0.blend(&v1, t))
            }
        }
    }

    fn cell_value(&self, idx: usize, rest: &[f64]) -> Result<T, TableError> {
        match &self.cells[idx] {
            Cell::Nested(table) => table.eval(rest),
            Cell::Value(value) if rest.is_empty() => Ok(value.clone()),
            Cell::Value(_) => Err(TableError::AxisMismatch {
                expected: self.depth,
                given: self.depth + rest.len(),
            }),
        }
    }
}

fn reduce(value: f64, period: f64) -> f64 {
    let reduced = value.rem_euclid(period);
    if reduced >= period {
        0.0
    } else {
        reduced
    }
}

impl<T> TryFrom<TableRepr<T>> for Table<T> {
    type Error = TableError;

    fn try_from(repr: TableRepr<T>) -> Result<Self, Self::Error> {
        Self::from_cells(repr.rows, repr.wrap)
    }
}

impl<T> From<Table<T>> for TableRepr<T> {
    fn from(table: Table<T>) -> Self {
        Self {
            wrap: table.wrap,
            rows: table.keys.into_iter().zip(table.cells).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn calibration() -> Table<f64> {
        Table::new(vec![
            (50.0, 56.0),
            (60.0, 62.0),
            (70.0, 70.0),
            (80.0, 80.0),
            (90.0, 89.0),
            (100.0, 99.0),
        ])
        .unwrap()
    }

    #[test]
    fn exact_key_returns_stored_value() {
        let table = calibration();
        assert_eq!(table.lookup(&[70.0]).unwrap(), 70.0);
        assert_eq!(table.lookup(&[90.0]).unwrap(), 89.0);
    }

    #[test]
    fn interpolates_between_bracketing_rows() {
        let table = calibration();
        let value = table.lookup(&[85.0]).unwrap();
        assert!((value - 84.5).abs() < 1e-12);
    }

    #[test]
    fn rows_may_be_given_unsorted() {
        let table = Table::new(vec![(20.0, 2.0), (0.0, 0.0), (10.0, 1.0)]).unwrap();
        assert_eq!(table.keys(), &[0.0, 10.0, 20.0]);
        assert!((table.lookup(&[15.0]).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_queries_extrapolate_nearest_segment() {
        let table = calibration();
        // slope of 50..60 is 0.6
        assert!((table.lookup(&[40.0]).unwrap() - 50.0).abs() < 1e-9);
        // slope of 90..100 is 1.0
        assert!((table.lookup(&[110.0]).unwrap() - 109.0).abs() < 1e-9);
    }

    #[test]
    fn single_row_table_is_constant() {
        let table = Table::new(vec![(2550.0, 41.0)]).unwrap();
        assert_eq!(table.lookup(&[1900.0]).unwrap(), 41.0);
        assert_eq!(table.lookup(&[3000.0]).unwrap(), 41.0);
    }

    #[test]
    fn interpolated_values_stay_within_bracket_and_are_monotonic() {
        let table = calibration();
        let keys = table.keys().to_vec();
        let mut rng = rand::rng();
        let mut samples: Vec<f64> = (0..400).map(|_| rng.random_range(50.0..100.0)).collect();
        samples.sort_by(f64::total_cmp);

        let mut previous = f64::NEG_INFINITY;
        for q in samples {
            let value = table.lookup(&[q]).unwrap();
            let hi = keys.partition_point(|k| *k <= q).min(keys.len() - 1);
            let lo = hi.saturating_sub(1);
            let v_lo = table.lookup(&[keys[lo]]).unwrap();
            let v_hi = table.lookup(&[keys[hi]]).unwrap();
            assert!(value >= v_lo - 1e-9 && value <= v_hi + 1e-9, "q={q} value={value}");
            assert!(value >= previous - 1e-9, "not monotonic at q={q}");
            previous = value;
        }
    }

    #[test]
    fn continuous_across_keys() {
        let table = calibration();
        for key in [60.0, 70.0, 80.0, 90.0] {
            let below = table.lookup(&[key - 1e-9]).unwrap();
            let at = table.lookup(&[key]).unwrap();
            let above = table.lookup(&[key + 1e-9]).unwrap();
            assert!((below - at).abs() < 1e-6);
            assert!((above - at).abs() < 1e-6);
        }
    }

    fn deviation() -> Table<f64> {
        Table::new(vec![
            (0.0, 1.0),
            (30.0, 2.0),
            (60.0, 2.0),
            (90.0, 1.0),
            (120.0, 0.0),
            (150.0, -1.0),
            (180.0, -2.0),
            (210.0, -2.0),
            (240.0, -1.0),
            (270.0, 0.0),
            (300.0, 1.0),
            (330.0, 3.0),
        ])
        .unwrap()
        .with_wrap(Wrap::degrees())
        .unwrap()
    }

    #[test]
    fn periodic_axis_is_continuous_across_seam() {
        let table = deviation();
        let a = table.lookup(&[359.0]).unwrap();
        let b = table.lookup(&[-1.0]).unwrap();
        assert!((a - b).abs() < 1e-12);
        // 330 -> 3.0, 360 -> 1.0
        assert!((table.lookup(&[345.0]).unwrap() - 2.0).abs() < 1e-12);
        assert!((table.lookup(&[720.0]).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn heading_valued_table_interpolates_through_north() {
        let table = Table::new(vec![(350.0, 352.0), (10.0, 12.0), (180.0, 181.0)])
            .unwrap()
            .with_wrap(Wrap::headings())
            .unwrap();
        let through_north = table.lookup(&[0.0]).unwrap();
        assert!((through_north - 2.0).abs() < 1e-12, "got {through_north}");
        let before_seam = table.lookup(&[355.0]).unwrap();
        assert!((before_seam - 357.0).abs() < 1e-12, "got {before_seam}");
    }

    #[test]
    fn periodic_keys_colliding_after_reduction_are_rejected() {
        let result = Table::new(vec![(0.0, 1.0), (360.0, 1.0)])
            .unwrap()
            .with_wrap(Wrap::degrees());
        assert_eq!(result, Err(TableError::DuplicateKey(0.0)));
    }

    #[test]
    fn nested_axes_interpolate_bilinear_and_trilinear() {
        // f(x, y) = 2x + 3y is reproduced exactly by bilinear interpolation.
        let inner = |x: f64| Table::new(vec![(0.0, 2.0 * x), (10.0, 2.0 * x + 30.0)]).unwrap();
        let table = Table::nested(vec![(0.0, inner(0.0)), (5.0, inner(5.0))]).unwrap();
        assert_eq!(table.depth(), 2);
        let value = table.lookup(&[2.5, 4.0]).unwrap();
        assert!((value - 17.0).abs() < 1e-12);

        // g(x, y, z) = x + y + z
        let plane = |x: f64| {
            Table::nested(vec![
                (0.0, Table::new(vec![(0.0, x), (1.0, x + 1.0)]).unwrap()),
                (1.0, Table::new(vec![(0.0, x + 1.0), (1.0, x + 2.0)]).unwrap()),
            ])
            .unwrap()
        };
        let cube = Table::nested(vec![(0.0, plane(0.0)), (1.0, plane(1.0))]).unwrap();
        assert_eq!(cube.depth(), 3);
        let value = cube.lookup(&[0.25, 0.5, 0.75]).unwrap();
        assert!((value - 1.5).abs() < 1e-12);
    }

    #[test]
    fn construction_rejects_malformed_tables() {
        assert_eq!(Table::<f64>::new(vec![]), Err(TableError::Empty));
        assert_eq!(
            Table::new(vec![(1.0, 1.0), (1.0, 2.0)]),
            Err(TableError::DuplicateKey(1.0))
        );
        assert!(matches!(
            Table::new(vec![(f64::NAN, 1.0)]),
            Err(TableError::NonFiniteKey(_))
        ));
        let ragged = Table::from_cells(
            vec![
                (0.0, Cell::Value(1.0)),
                (1.0, Cell::Nested(Table::new(vec![(0.0, 1.0)]).unwrap())),
            ],
            None,
        );
        assert_eq!(
            ragged,
            Err(TableError::RaggedDepth {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn lookup_rejects_wrong_axis_count() {
        let table = calibration();
        assert_eq!(
            table.lookup(&[1.0, 2.0]),
            Err(TableError::AxisMismatch {
                expected: 1,
                given: 2
            })
        );
    }

    #[test]
    fn deserializes_nested_and_periodic_tables() {
        let json = r#"{
            "rows": [
                [2550, {"rows": [[0, 860], [1000, 940]]}],
                [2400, {"rows": [[0, 745], [1000, 810]]}]
            ]
        }"#;
        let table: Table<f64> = serde_json::from_str(json).unwrap();
        assert_eq!(table.depth(), 2);
        assert_eq!(table.keys(), &[2400.0, 2550.0]);
        assert_eq!(table.lookup(&[2550.0, 500.0]).unwrap(), 900.0);

        let periodic: Table<f64> =
            serde_json::from_str(r#"{"wrap": {"period": 360}, "rows": [[0, 1], [180, -1]]}"#)
                .unwrap();
        assert_eq!(periodic.lookup(&[270.0]).unwrap(), 0.0);

        let invalid = serde_json::from_str::<Table<f64>>(r#"{"rows": []}"#);
        assert!(invalid.is_err());
    }
}
