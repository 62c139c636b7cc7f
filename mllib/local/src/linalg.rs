//! Dense and sparse feature vectors.

use std::fmt;

/// A feature vector in either dense or sparse form.
///
/// Sparse vectors keep their indices strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    Dense(Vec<f64>),
    Sparse {
        size: usize,
        indices: Vec<usize>,
        values: Vec<f64>,
    },
}

impl Vector {
    pub fn dense(values: Vec<f64>) -> Self {
        Vector::Dense(values)
    }

    /// Build a sparse vector from `(index, value)` pairs in any order.
    /// Later pairs win on duplicate indices; explicit zeros are kept.
    pub fn sparse(size: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(index, _)| *index);
        entries.dedup_by(|later, earlier| {
            if later.0 == earlier.0 {
                earlier.1 = later.1;
                true
            } else {
                false
            }
        });
        let (indices, values) = entries.into_iter().unzip();
        Vector::Sparse {
            size,
            indices,
            values,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Vector::Dense(values) => values.len(),
            Vector::Sparse { size, .. } => *size,
        }
    }

    pub fn get(&self, i: usize) -> f64 {
        match self {
            Vector::Dense(values) => values.get(i).copied().unwrap_or(0.0),
            Vector::Sparse {
                indices, values, ..
            } => indices
                .binary_search(&i)
                .map(|pos| values[pos])
                .unwrap_or(0.0),
        }
    }

    pub fn to_array(&self) -> Vec<f64> {
        match self {
            Vector::Dense(values) => values.clone(),
            Vector::Sparse {
                size,
                indices,
                values,
            } => {
                let mut out = vec![0.0; *size];
                for (&i, &v) in indices.iter().zip(values) {
                    out[i] = v;
                }
                out
            }
        }
    }

    /// Stored entries as `(index, value)` pairs, zeros included for dense vectors.
    pub fn active(&self) -> Vec<(usize, f64)> {
        match self {
            Vector::Dense(values) => values.iter().copied().enumerate().collect(),
            Vector::Sparse {
                indices, values, ..
            } => indices.iter().copied().zip(values.iter().copied()).collect(),
        }
    }

    pub fn num_nonzeros(&self) -> usize {
        self.active().iter().filter(|(_, v)| *v != 0.0).count()
    }

    pub fn to_dense(&self) -> Vector {
        Vector::Dense(self.to_array())
    }

    pub fn to_sparse(&self) -> Vector {
        let entries = self
            .active()
            .into_iter()
            .filter(|(_, v)| *v != 0.0)
            .collect();
        Vector::sparse(self.size(), entries)
    }

    /// The smaller of the two representations.
    pub fn compressed(&self) -> Vector {
        let nnz = self.num_nonzeros() as f64;
        if 1.5 * (nnz + 1.0) < self.size() as f64 {
            self.to_sparse()
        } else {
            self.to_dense()
        }
    }

    /// The p-norm; `p` must be at least 1.
    pub fn norm(&self, p: f64) -> f64 {
        let values = self.active();
        if p == 1.0 {
            values.iter().map(|(_, v)| v.abs()).sum()
        } else if p == 2.0 {
            values.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
        } else if p.is_infinite() {
            values.iter().fold(0.0, |acc, (_, v)| acc.max(v.abs()))
        } else {
            values
                .iter()
                .map(|(_, v)| v.abs().powf(p))
                .sum::<f64>()
                .powf(1.0 / p)
        }
    }

    /// Apply `f` to every stored value, keeping the representation.
    pub fn map_values(&self, f: impl Fn(usize, f64) -> f64) -> Vector {
        match self {
            Vector::Dense(values) => {
                Vector::Dense(values.iter().enumerate().map(|(i, &v)| f(i, v)).collect())
            }
            Vector::Sparse {
                size,
                indices,
                values,
            } => Vector::Sparse {
                size: *size,
                indices: indices.clone(),
                values: indices.iter().zip(values).map(|(&i, &v)| f(i, v)).collect(),
            },
        }
    }
}

/// Render a double the way the JVM prints it: `1.0`, `0.25`, `1.0E-4`.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{value:?}");
    }
    let scientific = format!("{value:E}");
    match scientific.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => scientific,
    }
}

fn join_doubles(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_double(*v))
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vector::Dense(values) => write!(f, "[{}]", join_doubles(values)),
            Vector::Sparse {
                size,
                indices,
                values,
            } => {
                let indices = indices
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "({size},[{indices}],[{}])", join_doubles(values))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_jvm_format() {
        assert_eq!(Vector::dense(vec![1.0, 0.5, 0.0]).to_string(), "[1.0,0.5,0.0]");
        assert_eq!(
            Vector::sparse(4, vec![(2, 1.0), (0, 3.5)]).to_string(),
            "(4,[0,2],[3.5,1.0])"
        );
        assert_eq!(Vector::sparse(3, vec![]).to_string(), "(3,[],[])");
        assert_eq!(format_double(1e-4), "1.0E-4");
        assert_eq!(format_double(12_500_000.0), "1.25E7");
        assert_eq!(format_double(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_compressed_picks_smaller_form() {
        let mostly_zero = Vector::dense(vec![0.0, 0.0, 0.0, 0.0, 7.0]);
        assert_eq!(
            mostly_zero.compressed(),
            Vector::Sparse {
                size: 5,
                indices: vec![4],
                values: vec![7.0]
            }
        );

        let full = Vector::sparse(3, vec![(0, 1.0), (1, 2.0), (2, 3.0)]);
        assert_eq!(full.compressed(), Vector::dense(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_sparse_access_and_norms() {
        let v = Vector::sparse(5, vec![(3, -4.0), (1, 3.0)]);
        assert_eq!(v.get(1), 3.0);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.to_array(), vec![0.0, 3.0, 0.0, -4.0, 0.0]);
        assert_eq!(v.norm(1.0), 7.0);
        assert_eq!(v.norm(2.0), 5.0);
        assert_eq!(v.norm(f64::INFINITY), 4.0);
        assert_eq!(v.num_nonzeros(), 2);
    }

    #[test]
    fn test_sparse_duplicate_index_keeps_last() {
        let v = Vector::sparse(3, vec![(1, 1.0), (1, 2.0)]);
        assert_eq!(v.active(), vec![(1, 2.0)]);
    }
}
