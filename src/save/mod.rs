use crate::{flds::named::NamedArray, Float};
use anyhow::{Context, Result};
use npy::NpyData;
use std::fs;
use std::path::Path;

/// Reads a flat `.npy` array of `Float`s and checks that it holds
/// `expected_len` values. Multi-dimensional files are read in C order.
pub fn load_npy(path: &str, expected_len: usize) -> Result<Vec<Float>> {
    let bytes = fs::read(path).with_context(|| format!("Could not open {}", path))?;
    let data: NpyData<Float> = NpyData::from_bytes(&bytes)
        .with_context(|| format!("Could not parse {} as an npy array", path))?;
    let values = data.to_vec();
    if values.len() != expected_len {
        return Err(anyhow::Error::msg(format!(
            "{} holds {} values, expected {}",
            path,
            values.len(),
            expected_len
        )));
    }
    Ok(values)
}

/// Writes the data of `arr` as a flat `.npy` array in row-major order,
/// creating the parent directory if needed.
pub fn save_npy(path: &str, arr: &NamedArray) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Unable to create output directory")?;
        }
    }
    npy::to_file(path, arr.data.iter().cloned())
        .with_context(|| format!("Could not save filtered data to {}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("gcm_filters_rs_{}", std::process::id()));
        dir.join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn saved_arrays_load_back() {
        let fld = crate::build_test_field(3, 4);
        let arr = NamedArray::from_field(&fld, "y", "x").unwrap();
        let path = tmp_path("nested/field.npy");
        save_npy(&path, &arr).unwrap();
        assert_eq!(load_npy(&path, 12).unwrap(), fld.spatial);

        let err = load_npy(&path, 13).unwrap_err();
        assert!(err.to_string().contains("expected 13"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = load_npy(&tmp_path("does_not_exist.npy"), 1).unwrap_err();
        assert!(err.to_string().starts_with("Could not open"));
    }
}
