use crate::error::Result;
use crate::ml::models::{Artifact, ArtifactKind, MLConfig, ModelMetadata};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// When a stored artifact must be retrained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    /// Artifacts written with any other version are stale
    pub format_version: u32,

    /// Optional maximum age
    pub max_age: Option<chrono::Duration>,
}

impl StalenessPolicy {
    pub fn from_config(config: &MLConfig) -> Self {
        Self {
            format_version: config.format_version,
            max_age: config.max_age_days.map(chrono::Duration::days),
        }
    }

    pub fn is_stale(&self, metadata: &ModelMetadata) -> bool {
        if metadata.format_version != self.format_version {
            return true;
        }
        match self.max_age {
            Some(max_age) => chrono::Utc::now() - metadata.trained_at > max_age,
            None => false,
        }
    }
}

/// How `load_or_train` obtained its artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    TrainedMissing,
    TrainedStale,
    TrainedCorrupt,
    TrainedForced,
}

impl LoadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOutcome::Loaded => "loaded",
            LoadOutcome::TrainedMissing => "missing",
            LoadOutcome::TrainedStale => "stale",
            LoadOutcome::TrainedCorrupt => "corrupt",
            LoadOutcome::TrainedForced => "forced",
        }
    }

    pub fn was_trained(&self) -> bool {
        !matches!(self, LoadOutcome::Loaded)
    }
}

/// Explicit load / train / save of model artifacts under one directory
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    model_dir: PathBuf,
    policy: StalenessPolicy,
}

impl ModelRegistry {
    pub fn new(model_dir: impl Into<PathBuf>, policy: StalenessPolicy) -> Self {
        Self {
            model_dir: model_dir.into(),
            policy,
        }
    }

    pub fn from_config(config: &MLConfig) -> Self {
        Self::new(&config.model_dir, StalenessPolicy::from_config(config))
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn policy(&self) -> &StalenessPolicy {
        &self.policy
    }

    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.model_dir.join(kind.file_name())
    }

    pub fn exists(&self, kind: ArtifactKind) -> bool {
        self.artifact_path(kind).exists()
    }

    pub fn is_stale(&self, metadata: &ModelMetadata) -> bool {
        self.policy.is_stale(metadata)
    }

    /// Read an artifact. `Ok(None)` when the file does not exist;
    /// an error when it exists but cannot be decoded.
    pub fn load<T: DeserializeOwned>(&self, kind: ArtifactKind) -> Result<Option<Artifact<T>>> {
        let path = self.artifact_path(kind);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(&path)?;
        let artifact: Artifact<T> = bincode::deserialize(&bytes)?;
        debug!(
            artifact = %kind,
            path = %path.display(),
            trained_at = %artifact.metadata.trained_at,
            "Artifact read from disk"
        );
        Ok(Some(artifact))
    }

    /// Write an artifact to a temp file in the same directory, then rename it
    /// over the target so readers never observe a partial file.
    pub fn save<T: Serialize>(&self, kind: ArtifactKind, artifact: &Artifact<T>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.model_dir)?;

        let path = self.artifact_path(kind);
        let tmp = self.model_dir.join(format!(
            ".{}.{}.tmp",
            kind.file_name(),
            uuid::Uuid::new_v4().simple()
        ));

        let bytes = bincode::serialize(artifact)?;
        if let Err(e) = std::fs::write(&tmp, &bytes).and_then(|_| std::fs::rename(&tmp, &path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!(
            artifact = %kind,
            path = %path.display(),
            bytes = bytes.len(),
            "Artifact saved"
        );
        Ok(path)
    }

    /// Load an artifact and check it against the staleness policy.
    /// `Err` carries the reason it has to be retrained.
    fn inspect<T: DeserializeOwned>(&self, kind: ArtifactKind) -> std::result::Result<Artifact<T>, LoadOutcome> {
        match self.load::<T>(kind) {
            Ok(Some(artifact)) if !self.is_stale(&artifact.metadata) => Ok(artifact),
            Ok(Some(artifact)) => {
                warn!(
                    artifact = %kind,
                    format_version = artifact.metadata.format_version,
                    expected_version = self.policy.format_version,
                    trained_at = %artifact.metadata.trained_at,
                    "Artifact is stale, retraining"
                );
                Err(LoadOutcome::TrainedStale)
            }
            Ok(None) => {
                info!(artifact = %kind, "Artifact missing, training");
                Err(LoadOutcome::TrainedMissing)
            }
            Err(e) => {
                warn!(artifact = %kind, error = %e, "Artifact unreadable, retraining");
                Err(LoadOutcome::TrainedCorrupt)
            }
        }
    }

    /// Load an artifact, training and saving a fresh one when it is absent,
    /// unreadable or stale.
    pub fn load_or_train<T, F>(&self, kind: ArtifactKind, train: F) -> Result<(Artifact<T>, LoadOutcome)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<Artifact<T>>,
    {
        let outcome = match self.inspect::<T>(kind) {
            Ok(artifact) => {
                info!(artifact = %kind, "Loaded trained artifact");
                return Ok((artifact, LoadOutcome::Loaded));
            }
            Err(outcome) => outcome,
        };

        let artifact = train()?;
        self.save(kind, &artifact)?;
        Ok((artifact, outcome))
    }

    /// Same as `load_or_train` for a model and the scaler fitted with it.
    /// If either half must be retrained both are, so the pair stays consistent.
    pub fn load_or_train_pair<M, S, F>(
        &self,
        model_kind: ArtifactKind,
        scaler_kind: ArtifactKind,
        train: F,
    ) -> Result<(Artifact<M>, Artifact<S>, LoadOutcome)>
    where
        M: Serialize + DeserializeOwned,
        S: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<(Artifact<M>, Artifact<S>)>,
    {
        let outcome = match (self.inspect::<M>(model_kind), self.inspect::<S>(scaler_kind)) {
            (Ok(model), Ok(scaler)) => {
                info!(model = %model_kind, scaler = %scaler_kind, "Loaded trained model pair");
                return Ok((model, scaler, LoadOutcome::Loaded));
            }
            (Err(outcome), _) | (_, Err(outcome)) => outcome,
        };

        let (model, scaler) = train()?;
        self.save(scaler_kind, &scaler)?;
        self.save(model_kind, &model)?;
        Ok((model, scaler, outcome))
    }

    /// Train and save unconditionally
    pub fn retrain<T, F>(&self, kind: ArtifactKind, train: F) -> Result<(Artifact<T>, LoadOutcome)>
    where
        T: Serialize,
        F: FnOnce() -> Result<Artifact<T>>,
    {
        info!(artifact = %kind, "Forced retraining");
        let artifact = train()?;
        self.save(kind, &artifact)?;
        Ok((artifact, LoadOutcome::TrainedForced))
    }

    /// Train and save a model pair unconditionally
    pub fn retrain_pair<M, S, F>(
        &self,
        model_kind: ArtifactKind,
        scaler_kind: ArtifactKind,
        train: F,
    ) -> Result<(Artifact<M>, Artifact<S>, LoadOutcome)>
    where
        M: Serialize,
        S: Serialize,
        F: FnOnce() -> Result<(Artifact<M>, Artifact<S>)>,
    {
        info!(model = %model_kind, scaler = %scaler_kind, "Forced retraining");
        let (model, scaler) = train()?;
        self.save(scaler_kind, &scaler)?;
        self.save(model_kind, &model)?;
        Ok((model, scaler, LoadOutcome::TrainedForced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::models::{ModelType, ARTIFACT_FORMAT_VERSION};
    use std::cell::Cell;
    use tempfile::TempDir;

    fn registry(dir: &TempDir) -> ModelRegistry {
        ModelRegistry::new(
            dir.path(),
            StalenessPolicy {
                format_version: ARTIFACT_FORMAT_VERSION,
                max_age: None,
            },
        )
    }

    fn numbers(values: Vec<u32>) -> Result<Artifact<Vec<u32>>> {
        Ok(Artifact::new(
            ModelMetadata::new("numbers", ModelType::RuleTable),
            values,
        ))
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<Artifact<Vec<u32>>> =
            registry(&dir).load(ArtifactKind::DiseaseRisk).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);

        let path = registry
            .save(ArtifactKind::CropScaler, &numbers(vec![1, 2, 3]).unwrap())
            .unwrap();
        assert_eq!(path, dir.path().join("crop_scaler.bin"));

        let loaded: Artifact<Vec<u32>> = registry.load(ArtifactKind::CropScaler).unwrap().unwrap();
        assert_eq!(loaded.payload, vec![1, 2, 3]);

        // no temp files left behind
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_load_or_train_trains_once() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let calls = Cell::new(0);

        let train = || {
            calls.set(calls.get() + 1);
            numbers(vec![7])
        };
        let (_, first) = registry.load_or_train(ArtifactKind::DiseaseRisk, train).unwrap();

        let train = || {
            calls.set(calls.get() + 1);
            numbers(vec![8])
        };
        let (artifact, second) = registry.load_or_train(ArtifactKind::DiseaseRisk, train).unwrap();

        assert_eq!(first, LoadOutcome::TrainedMissing);
        assert_eq!(second, LoadOutcome::Loaded);
        assert_eq!(artifact.payload, vec![7]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_stale_version_is_retrained() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);

        let old = Artifact::new(
            ModelMetadata::new("numbers", ModelType::RuleTable)
                .with_format_version(ARTIFACT_FORMAT_VERSION + 1),
            vec![1u32],
        );
        registry.save(ArtifactKind::YieldScaler, &old).unwrap();

        let (artifact, outcome) = registry
            .load_or_train(ArtifactKind::YieldScaler, || numbers(vec![2]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::TrainedStale);
        assert_eq!(artifact.payload, vec![2]);
    }

    #[test]
    fn test_max_age_marks_old_artifacts_stale() {
        let policy = StalenessPolicy {
            format_version: ARTIFACT_FORMAT_VERSION,
            max_age: Some(chrono::Duration::days(30)),
        };
        let mut metadata = ModelMetadata::new("numbers", ModelType::RuleTable);
        assert!(!policy.is_stale(&metadata));

        metadata.trained_at = chrono::Utc::now() - chrono::Duration::days(31);
        assert!(policy.is_stale(&metadata));
    }

    #[test]
    fn test_corrupt_file_is_retrained() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        std::fs::write(registry.artifact_path(ArtifactKind::CropRecommender), b"garbage").unwrap();

        let (artifact, outcome) = registry
            .load_or_train(ArtifactKind::CropRecommender, || numbers(vec![5]))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::TrainedCorrupt);
        assert_eq!(artifact.payload, vec![5]);

        let reloaded: Artifact<Vec<u32>> =
            registry.load(ArtifactKind::CropRecommender).unwrap().unwrap();
        assert_eq!(reloaded.payload, vec![5]);
    }

    #[test]
    fn test_pair_retrains_when_scaler_missing() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        registry
            .save(ArtifactKind::YieldPredictor, &numbers(vec![1]).unwrap())
            .unwrap();

        let (model, scaler, outcome) = registry
            .load_or_train_pair::<Vec<u32>, Vec<u32>, _>(
                ArtifactKind::YieldPredictor,
                ArtifactKind::YieldScaler,
                || Ok((numbers(vec![10])?, numbers(vec![20])?)),
            )
            .unwrap();

        assert_eq!(outcome, LoadOutcome::TrainedMissing);
        assert_eq!(model.payload, vec![10]);
        assert_eq!(scaler.payload, vec![20]);
        assert!(registry.exists(ArtifactKind::YieldScaler));
    }
}
