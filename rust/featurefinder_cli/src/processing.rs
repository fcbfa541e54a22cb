use featurefinder::{
    find_features,
    sort_features,
    Feature,
    FeatureFinderConfig,
    Ms1Data,
    NoProgress,
};
use indicatif::{
    ParallelProgressIterator,
    ProgressStyle,
};
use rayon::prelude::*;
use std::path::{
    Path,
    PathBuf,
};
use std::time::Instant;
use tracing::{
    debug,
    error,
    info,
};

use crate::config::OutputConfig;
use crate::errors::CliError;

pub fn load_ms1_data(path: &Path) -> Result<Ms1Data, CliError> {
    let file = std::fs::File::open(path).map_err(|e| CliError::io(e, path))?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| CliError::Processing {
        source: format!("invalid MS1 data: {}", e),
        path: Some(path.to_string_lossy().to_string()),
    })
}

pub fn write_features(path: &Path, features: &[Feature]) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| CliError::io(e, path))?;
    for feature in features {
        writer.serialize(feature).map_err(|e| CliError::io(e, path))?;
    }
    writer.flush().map_err(|e| CliError::io(e, path))?;
    Ok(())
}

/// Finds the features of one file and writes its table, returning the
/// number of features written.
pub fn process_file(
    path: &Path,
    config: &FeatureFinderConfig,
    output: &OutputConfig,
) -> Result<usize, CliError> {
    let st = Instant::now();
    let data = load_ms1_data(path)?;
    debug!(
        "Loaded {} scans from {} in {:?}",
        data.num_scans(),
        path.display(),
        st.elapsed()
    );

    let mut features = find_features(&data, config, &NoProgress)
        .map_err(|e| CliError::Processing {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        })?
        .features;
    sort_features(&mut features);

    let out_path = output.features_path(path);
    write_features(&out_path, &features)?;
    info!(
        "Wrote {} features for {} to {} in {:?}",
        features.len(),
        path.display(),
        out_path.display(),
        st.elapsed()
    );
    Ok(features.len())
}

/// Processes every file in parallel, one failure does not stop the others.
pub fn process_files(
    files: &[PathBuf],
    config: &FeatureFinderConfig,
    output: &OutputConfig,
) -> Vec<(PathBuf, Result<usize, CliError>)> {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    files
        .par_iter()
        .progress_with_style(style)
        .map(|path| {
            let res = process_file(path, config, output);
            if let Err(e) = &res {
                error!("{}", e);
            }
            (path.clone(), res)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "featurefinder_cli_{}_{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_fails_alone() {
        let dir = scratch_dir("missing");
        let input = dir.join("empty.json");
        let data = Ms1Data {
            scan_indices: vec![1, 2, 3],
            retention_times: vec![0.0, 0.1, 0.2],
            mz_arrays: vec![vec![], vec![], vec![]],
            intensity_arrays: vec![vec![], vec![], vec![]],
        };
        std::fs::write(&input, serde_json::to_string(&data).unwrap()).unwrap();

        let output = OutputConfig {
            directory: dir.clone(),
        };
        let results = process_files(
            &[dir.join("does_not_exist.json"), input.clone()],
            &FeatureFinderConfig::default(),
            &output,
        );
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].1, Err(CliError::Io { .. })));
        assert_eq!(results[1].1.as_ref().ok(), Some(&0));

        // Header only
        let table = std::fs::read_to_string(output.features_path(&input)).unwrap();
        assert!(table.is_empty() || table.lines().count() <= 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_written_columns() {
        let dir = scratch_dir("columns");
        let path = dir.join("out.csv");
        let feature = Feature {
            mz: 500.0,
            mz_std: 0.0,
            most_abundant_mz: 500.5,
            charge: 2,
            rt_start: 1.0,
            rt_apex: 1.5,
            rt_end: 2.0,
            fwhm: 0.4,
            n_isotopes: 3,
            n_scans: 12,
            neutral_mass: 997.985,
            intensity_apex: 100.0,
            intensity_sum: 1000.0,
        };
        write_features(&path, &[feature]).unwrap();
        let table = std::fs::read_to_string(&path).unwrap();
        let header = table.lines().next().unwrap();
        assert_eq!(
            header,
            "mz,mz_std,most_abundant_mz,charge,rt_start,rt_apex,rt_end,fwhm,n_isotopes,n_scans,neutral_mass,intensity_apex,intensity_sum"
        );
        assert_eq!(table.lines().count(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
