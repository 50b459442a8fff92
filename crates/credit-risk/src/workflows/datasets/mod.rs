//! Home Credit dataset files on disk.
//!
//! The data directory is passed in explicitly; nothing here searches the
//! filesystem for a project root.

mod csv_io;

pub use csv_io::{read_table, write_table};

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::workflows::error::SchemaError;
use crate::workflows::features::FeatureTable;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV error in {}: {source}", path.display())]
    CsvFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("invalid table layout: {0}")]
    Schema(#[from] SchemaError),
}

impl DatasetError {
    /// Attach the file a stream-level CSV error came from.
    fn in_file(self, path: &Path) -> Self {
        match self {
            DatasetError::Csv(source) => DatasetError::CsvFile {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

/// The raw Home Credit exports, by file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawDataset {
    ApplicationTrain,
    ApplicationTest,
    Bureau,
    BureauBalance,
    CreditCardBalance,
    InstallmentsPayments,
    PosCashBalance,
    PreviousApplication,
}

impl RawDataset {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::ApplicationTrain,
            Self::ApplicationTest,
            Self::Bureau,
            Self::BureauBalance,
            Self::CreditCardBalance,
            Self::InstallmentsPayments,
            Self::PosCashBalance,
            Self::PreviousApplication,
        ]
    }

    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::ApplicationTrain => "application_train",
            Self::ApplicationTest => "application_test",
            Self::Bureau => "bureau",
            Self::BureauBalance => "bureau_balance",
            Self::CreditCardBalance => "credit_card_balance",
            Self::InstallmentsPayments => "installments_payments",
            Self::PosCashBalance => "POS_CASH_balance",
            Self::PreviousApplication => "previous_application",
        }
    }
}

/// Every raw table that was present on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDatasets {
    pub application_train: Option<FeatureTable>,
    pub application_test: Option<FeatureTable>,
    pub bureau: Option<FeatureTable>,
    pub bureau_balance: Option<FeatureTable>,
    pub credit_card_balance: Option<FeatureTable>,
    pub installments_payments: Option<FeatureTable>,
    pub pos_cash_balance: Option<FeatureTable>,
    pub previous_application: Option<FeatureTable>,
}

impl RawDatasets {
    pub fn get(&self, dataset: RawDataset) -> Option<&FeatureTable> {
        self.slot(dataset).as_ref()
    }

    fn slot(&self, dataset: RawDataset) -> &Option<FeatureTable> {
        match dataset {
            RawDataset::ApplicationTrain => &self.application_train,
            RawDataset::ApplicationTest => &self.application_test,
            RawDataset::Bureau => &self.bureau,
            RawDataset::BureauBalance => &self.bureau_balance,
            RawDataset::CreditCardBalance => &self.credit_card_balance,
            RawDataset::InstallmentsPayments => &self.installments_payments,
            RawDataset::PosCashBalance => &self.pos_cash_balance,
            RawDataset::PreviousApplication => &self.previous_application,
        }
    }

    fn slot_mut(&mut self, dataset: RawDataset) -> &mut Option<FeatureTable> {
        match dataset {
            RawDataset::ApplicationTrain => &mut self.application_train,
            RawDataset::ApplicationTest => &mut self.application_test,
            RawDataset::Bureau => &mut self.bureau,
            RawDataset::BureauBalance => &mut self.bureau_balance,
            RawDataset::CreditCardBalance => &mut self.credit_card_balance,
            RawDataset::InstallmentsPayments => &mut self.installments_payments,
            RawDataset::PosCashBalance => &mut self.pos_cash_balance,
            RawDataset::PreviousApplication => &mut self.previous_application,
        }
    }
}

/// Engineered train/test tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedDatasets {
    pub train: Option<FeatureTable>,
    pub test: Option<FeatureTable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessedSplit {
    Train,
    Test,
}

impl ProcessedSplit {
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Train => "train_processed.csv",
            Self::Test => "test_processed.csv",
        }
    }
}

/// Resolves dataset files under `<data_dir>/raw` and `<data_dir>/processed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCatalog {
    data_dir: PathBuf,
}

impl DatasetCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn raw_path(&self, dataset: RawDataset) -> PathBuf {
        self.raw_dir().join(format!("{}.csv", dataset.file_stem()))
    }

    pub fn processed_path(&self, split: ProcessedSplit) -> PathBuf {
        self.processed_dir().join(split.file_name())
    }

    /// Which raw files exist, in catalog order.
    pub fn available(&self) -> Vec<(RawDataset, bool)> {
        RawDataset::ordered()
            .into_iter()
            .map(|dataset| (dataset, self.raw_path(dataset).is_file()))
            .collect()
    }

    /// Load every raw file that exists. Absent files are logged and skipped.
    pub fn load_raw(&self) -> Result<RawDatasets, DatasetError> {
        info!(path = %self.raw_dir().display(), "loading raw datasets");
        let mut datasets = RawDatasets::default();

        for dataset in RawDataset::ordered() {
            let path = self.raw_path(dataset);
            if !path.is_file() {
                warn!(file = dataset.file_stem(), path = %path.display(), "raw dataset missing");
                continue;
            }

            let table = load_table(&path)?;
            info!(
                file = dataset.file_stem(),
                rows = table.row_count(),
                columns = table.columns().len(),
                "loaded raw dataset"
            );
            *datasets.slot_mut(dataset) = Some(table);
        }

        Ok(datasets)
    }

    pub fn load_processed(&self) -> Result<ProcessedDatasets, DatasetError> {
        let load = |split: ProcessedSplit| -> Result<Option<FeatureTable>, DatasetError> {
            let path = self.processed_path(split);
            if path.is_file() {
                load_table(&path).map(Some)
            } else {
                Ok(None)
            }
        };

        Ok(ProcessedDatasets {
            train: load(ProcessedSplit::Train)?,
            test: load(ProcessedSplit::Test)?,
        })
    }

    pub fn write_processed(
        &self,
        split: ProcessedSplit,
        table: &FeatureTable,
    ) -> Result<PathBuf, DatasetError> {
        let dir = self.processed_dir();
        std::fs::create_dir_all(&dir).map_err(|source| DatasetError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = self.processed_path(split);
        save_table(&path, table)?;
        info!(path = %path.display(), rows = table.row_count(), "wrote processed dataset");
        Ok(path)
    }
}

pub fn load_table(path: &Path) -> Result<FeatureTable, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(file).map_err(|err| err.in_file(path))
}

pub fn save_table(path: &Path, table: &FeatureTable) -> Result<(), DatasetError> {
    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_table(table, BufWriter::new(file)).map_err(|err| err.in_file(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::features::columns;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "credit-risk-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("raw")).expect("create scratch dir");
        dir
    }

    #[test]
    fn paths_follow_the_data_directory() {
        let catalog = DatasetCatalog::new("/srv/credit");
        assert_eq!(
            catalog.raw_path(RawDataset::PosCashBalance),
            PathBuf::from("/srv/credit/raw/POS_CASH_balance.csv")
        );
        assert_eq!(
            catalog.processed_path(ProcessedSplit::Test),
            PathBuf::from("/srv/credit/processed/test_processed.csv")
        );
    }

    #[test]
    fn load_raw_skips_missing_files() {
        let dir = scratch_dir("raw");
        std::fs::write(
            dir.join("raw/application_train.csv"),
            "SK_ID_CURR,TARGET,DAYS_BIRTH\n100002,1,-9461\n",
        )
        .expect("write fixture");

        let catalog = DatasetCatalog::new(&dir);
        let datasets = catalog.load_raw().expect("load");

        let train = datasets
            .get(RawDataset::ApplicationTrain)
            .expect("train present");
        assert_eq!(train.numeric(columns::DAYS_BIRTH).expect("column"), &[Some(-9461.0)]);
        assert!(datasets.bureau.is_none());
        assert_eq!(
            catalog.available()[0],
            (RawDataset::ApplicationTrain, true)
        );
        assert_eq!(catalog.available()[2], (RawDataset::Bureau, false));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn processed_tables_round_trip_through_disk() {
        let dir = scratch_dir("processed");
        let catalog = DatasetCatalog::new(&dir);
        let table = FeatureTable::from_records(&[]);

        let path = catalog
            .write_processed(ProcessedSplit::Train, &table)
            .expect("write");
        assert!(path.ends_with("processed/train_processed.csv"));

        let processed = catalog.load_processed().expect("load");
        assert_eq!(processed.train.expect("train").column_names(), table.column_names());
        assert!(processed.test.is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = scratch_dir("malformed");
        let path = dir.join("raw/bureau.csv");
        std::fs::write(&path, "SK_ID_CURR,SK_ID_BUREAU\n100001,5896630,extra\n")
            .expect("write fixture");

        match load_table(&path).expect_err("ragged record") {
            DatasetError::CsvFile { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected csv file error, got {other:?}"),
        }
        let err = DatasetCatalog::new(&dir).load_raw().expect_err("load fails");
        assert!(err.to_string().contains("bureau.csv"), "message was {err}");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_table(Path::new("./does-not-exist.csv")).expect_err("io error");
        match err {
            DatasetError::Io { path, .. } => assert_eq!(path, PathBuf::from("./does-not-exist.csv")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
