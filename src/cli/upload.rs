use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;
use ziprepo::config::extension_allowed;
use ziprepo::core::{Credentials, ZiprepoError, ZiprepoResult};
use ziprepo::di::{ConfigProvider, ServiceContainer};
use ziprepo::extract::{ArchiveExtractor, ExtractionResult, InputFile};
use ziprepo::github::CreateRepository;
use ziprepo::upload::UploadRequest;

pub struct UploadOptions {
    pub inputs: Vec<PathBuf>,
    pub repo: String,
    pub existing: bool,
    pub description: Option<String>,
    pub private: bool,
    pub readme: bool,
}

pub async fn run(options: UploadOptions) -> ZiprepoResult<()> {
    let container = ServiceContainer::new()?;

    // Reject bad inputs before touching the network
    let files = collect_inputs(
        &options.inputs,
        container.config.as_ref(),
        &container.extractor(),
    )
    .await?;
    println!(
        "Prepared {} file(s), {} bytes",
        files.len(),
        files.total_bytes()
    );

    let credentials = Credentials::resolve()?;

    if !options.existing {
        let repo = container
            .client
            .create_repository(
                &credentials,
                &CreateRepository {
                    name: options.repo.clone(),
                    description: options.description.clone(),
                    private: options.private,
                    auto_init: options.readme,
                },
            )
            .await?;
        println!("✓ Created repository {}", repo.full_name);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nStopping after the current file...");
                cancel.store(true, Ordering::SeqCst);
            }
        })
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files")
            .map_err(|e| ZiprepoError::Config(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-"),
    );

    let uploader = container.uploader().with_progress(pb.clone());
    let request = UploadRequest {
        repo_name: options.repo,
        files,
        existing: options.existing,
    };

    let result = uploader.upload(&credentials, &request, &cancel).await;
    watcher.abort();

    match result {
        Ok(outcome) => {
            pb.finish_with_message("Upload complete");
            println!("✓ {}", outcome);
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e)
        }
    }
}

/// Validate the inputs against the intake rules and extract them
///
/// A folder must be the only input and its files together stay under the
/// size ceiling. Files must exist, stay under the size ceiling and pass the
/// extension allow-list.
pub async fn collect_inputs(
    inputs: &[PathBuf],
    config: &dyn ConfigProvider,
    extractor: &ArchiveExtractor,
) -> ZiprepoResult<ExtractionResult> {
    for input in inputs {
        if !input.exists() {
            return Err(ZiprepoError::Path(format!(
                "Input not found: {}",
                input.display()
            )));
        }
    }

    if let Some(folder) = inputs.iter().find(|p| p.is_dir()) {
        if inputs.len() > 1 {
            return Err(ZiprepoError::InputRejected {
                name: folder.display().to_string(),
                reason: "a folder must be the only input".to_string(),
            });
        }
        check_folder(folder, config)?;
        return extractor.process_folder(folder).await;
    }

    let mut files = Vec::with_capacity(inputs.len());
    for input in inputs {
        check_input(input, config)?;
        files.push(InputFile::from_path(input)?);
    }
    debug!(inputs = files.len(), "Inputs accepted");

    extractor.process_files(files).await
}

fn check_folder(root: &Path, config: &dyn ConfigProvider) -> ZiprepoResult<()> {
    let mut total: u64 = 0;
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }

    if total > config.max_input_bytes() {
        return Err(ZiprepoError::InputRejected {
            name: root.display().to_string(),
            reason: format!(
                "folder holds {} bytes, exceeding the {} byte limit",
                total,
                config.max_input_bytes()
            ),
        });
    }
    Ok(())
}

fn check_input(path: &Path, config: &dyn ConfigProvider) -> ZiprepoResult<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    if !extension_allowed(config.allowed_extensions(), &name) {
        return Err(ZiprepoError::InputRejected {
            name,
            reason: format!(
                "only {} files are accepted",
                config
                    .allowed_extensions()
                    .iter()
                    .map(|e| format!(".{}", e.trim_start_matches('.')))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        });
    }

    let size = std::fs::metadata(path)?.len();
    if size > config.max_input_bytes() {
        return Err(ZiprepoError::InputRejected {
            name,
            reason: format!(
                "{} bytes exceeds the {} byte limit",
                size,
                config.max_input_bytes()
            ),
        });
    }

    Ok(())
}
