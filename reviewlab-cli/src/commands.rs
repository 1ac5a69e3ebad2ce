//! Subcommand handlers.

use crate::Commands;
use anyhow::Context;
use reviewlab_core::config::AppConfig;
use reviewlab_core::data::{pipeline, serialize, SentimentMapping, ValidationMode};
use reviewlab_core::remote::{
    Channel, DatasetLocation, DatasetStore, HostingClient, HttpDatasetStore, HttpHostingClient,
    HttpInferenceClient, HttpTrainingClient, InferenceClient, TrainingClient,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// CLI-facing spelling of the invalid-record policy.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OnInvalid {
    /// Abort on the first invalid record
    Fail,
    /// Skip invalid records and report them at the end
    Skip,
}

impl From<OnInvalid> for ValidationMode {
    fn from(value: OnInvalid) -> Self {
        match value {
            OnInvalid::Fail => ValidationMode::FailFast,
            OnInvalid::Skip => ValidationMode::CollectAndReport,
        }
    }
}

pub async fn handle_command(command: Commands, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Prepare {
            input,
            out_dir,
            ratio,
            seed,
            no_shuffle,
            on_invalid,
            deny_empty_split,
        } => prepare(
            &config,
            &input,
            &out_dir,
            ratio,
            seed,
            no_shuffle,
            on_invalid,
            deny_empty_split,
        ),
        Commands::Upload {
            train,
            validation,
            name,
        } => upload(&config, &train, &validation, name).await,
        Commands::Train {
            train_uri,
            validation_uri,
            epochs,
            learning_rate,
            vector_dim,
            word_ngrams,
            no_early_stopping,
            wait,
            poll_secs,
        } => {
            train(
                &config,
                train_uri,
                validation_uri,
                epochs,
                learning_rate,
                vector_dim,
                word_ngrams,
                no_early_stopping,
                wait,
                poll_secs,
            )
            .await
        }
        Commands::Deploy {
            artifact,
            instance_type,
            instance_count,
        } => deploy(&config, &artifact, instance_type, instance_count).await,
        Commands::Predict {
            endpoint,
            text,
            top_k,
        } => predict(&config, &endpoint, text, top_k).await,
    }
}

#[allow(clippy::too_many_arguments)]
fn prepare(
    config: &AppConfig,
    input: &Path,
    out_dir: &Path,
    ratio: Option<f64>,
    seed: Option<u64>,
    no_shuffle: bool,
    on_invalid: Option<OnInvalid>,
    deny_empty_split: bool,
) -> anyhow::Result<()> {
    let mut options = config.prepare.clone();
    if let Some(r) = ratio {
        options.split_ratio = r;
    }
    if let Some(s) = seed {
        options.seed = Some(s);
    }
    if no_shuffle {
        options.shuffle = false;
    }
    if let Some(policy) = on_invalid {
        options.on_invalid = policy.into();
    }
    if deny_empty_split {
        options.allow_empty_split = false;
    }

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );
    let prepared = pipeline::prepare_jsonl(reader, &SentimentMapping, &options)?;

    std::fs::create_dir_all(out_dir)?;
    let train_path = out_dir.join("reviews.train");
    let validation_path = out_dir.join("reviews.validation");
    write_subset(&train_path, &prepared.train)?;
    write_subset(&validation_path, &prepared.validation)?;

    println!(
        "Prepared {} records: {} train -> {}, {} validation -> {}",
        prepared.total(),
        prepared.train.len(),
        train_path.display(),
        prepared.validation.len(),
        validation_path.display(),
    );
    if !prepared.skipped.is_empty() {
        println!("Skipped {} invalid record(s):", prepared.skipped.len());
        for skip in &prepared.skipped {
            println!("  line {}: {}", skip.index, skip.error);
        }
    }
    Ok(())
}

fn write_subset(
    path: &Path,
    records: &[reviewlab_core::LabeledReview],
) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    serialize::write_labeled(records, &mut writer)?;
    writer.flush()?;
    Ok(())
}

async fn upload(
    config: &AppConfig,
    train: &Path,
    validation: &Path,
    name: Option<String>,
) -> anyhow::Result<()> {
    let store = HttpDatasetStore::new(config.service.clone())?;
    let name = name.unwrap_or_else(|| format!("reviews-{}", uuid::Uuid::new_v4()));

    let train_body = std::fs::read(train)
        .with_context(|| format!("reading {}", train.display()))?;
    let validation_body = std::fs::read(validation)
        .with_context(|| format!("reading {}", validation.display()))?;

    let train_loc = store
        .upload(Channel::Train, &format!("{name}.train"), train_body)
        .await?;
    let validation_loc = store
        .upload(
            Channel::Validation,
            &format!("{name}.validation"),
            validation_body,
        )
        .await?;

    println!("train:      {}", train_loc.uri);
    println!("validation: {}", validation_loc.uri);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn train(
    config: &AppConfig,
    train_uri: String,
    validation_uri: String,
    epochs: Option<u32>,
    learning_rate: Option<f64>,
    vector_dim: Option<u32>,
    word_ngrams: Option<u32>,
    no_early_stopping: bool,
    wait: bool,
    poll_secs: u64,
) -> anyhow::Result<()> {
    let mut hyperparameters = config.training.clone();
    if let Some(e) = epochs {
        hyperparameters.epochs = e;
    }
    if let Some(lr) = learning_rate {
        hyperparameters.learning_rate = lr;
    }
    if let Some(d) = vector_dim {
        hyperparameters.vector_dim = d;
    }
    if let Some(n) = word_ngrams {
        hyperparameters.word_ngrams = n;
    }
    if no_early_stopping {
        hyperparameters.early_stopping = false;
    }

    let client = HttpTrainingClient::new(config.service.clone())?;
    let train_loc = DatasetLocation {
        channel: Channel::Train,
        uri: train_uri,
    };
    let validation_loc = DatasetLocation {
        channel: Channel::Validation,
        uri: validation_uri,
    };

    let job = client
        .start(&train_loc, &validation_loc, &hyperparameters)
        .await?;
    println!("Started training job {}", job.id);

    if wait {
        let job = client
            .wait(&job.id, Duration::from_secs(poll_secs))
            .await?;
        match job.artifact_uri {
            Some(uri) => println!("Completed. Artifact: {uri}"),
            None => println!("Completed, but the service reported no artifact URI"),
        }
    }
    Ok(())
}

async fn deploy(
    config: &AppConfig,
    artifact: &str,
    instance_type: Option<String>,
    instance_count: Option<u32>,
) -> anyhow::Result<()> {
    let mut deployment = config.deploy.clone();
    if let Some(t) = instance_type {
        deployment.instance_type = t;
    }
    if let Some(c) = instance_count {
        deployment.instance_count = c;
    }

    let client = HttpHostingClient::new(config.service.clone())?;
    let endpoint = client.deploy(artifact, &deployment).await?;
    println!("Endpoint {} ready at {}", endpoint.name, endpoint.url);
    Ok(())
}

async fn predict(
    config: &AppConfig,
    endpoint: &str,
    text: Vec<String>,
    top_k: usize,
) -> anyhow::Result<()> {
    let client = HttpInferenceClient::new(config.service.clone())?;
    let results = client.predict(endpoint, &text, top_k).await?;

    for (instance, predictions) in text.iter().zip(results) {
        println!("{instance}");
        for p in predictions {
            println!("  {} ({:.4})", p.label, p.probability);
        }
    }
    Ok(())
}
