use std::sync::Arc;

use crate::adapters::{AppConfig, FfmpegAdapter, FfprobeAdapter};
use crate::app::{
    edit_interactor::EditInteractor, inspect_interactor::InspectInteractor,
    verify_interactor::VerifyInteractor,
};
use crate::engine::progress::ProgressSink;
use crate::output::registry::TempArtifactRegistry;
use crate::ports::{EncoderPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn edit_interactor(&self) -> Arc<EditInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn verify_interactor(&self) -> Arc<VerifyInteractor>;
    fn registry(&self) -> Arc<TempArtifactRegistry>;

    /// Purge every temp artifact still registered
    fn shutdown(&self) -> usize {
        self.registry().purge_all()
    }
}

pub struct DefaultAppContainer {
    edit_interactor: Arc<EditInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
    verify_interactor: Arc<VerifyInteractor>,
    registry: Arc<TempArtifactRegistry>,
}

impl DefaultAppContainer {
    /// Wire the ffprobe/ffmpeg adapters and the process-wide registry
    pub fn new(config: &AppConfig, progress: Arc<dyn ProgressSink>) -> Self {
        let probe_port: Arc<dyn ProbePort> =
            Arc::new(FfprobeAdapter::new(&config.ffprobe_path).strict(config.strict_probe));
        let encoder_port: Arc<dyn EncoderPort> = Arc::new(FfmpegAdapter::new(&config.ffmpeg_path));

        Self::with_ports(
            config,
            probe_port,
            encoder_port,
            TempArtifactRegistry::global(),
            progress,
        )
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        config: &AppConfig,
        probe_port: Arc<dyn ProbePort>,
        encoder_port: Arc<dyn EncoderPort>,
        registry: Arc<TempArtifactRegistry>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        let temp_dir = config.temp_dir();

        let edit_interactor = Arc::new(
            EditInteractor::new(
                Arc::clone(&probe_port),
                Arc::clone(&encoder_port),
                Arc::clone(&registry),
                progress,
                temp_dir.clone(),
            )
            .with_threads(config.effective_threads()),
        );

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::clone(&probe_port),
            encoder_port,
            Arc::clone(&registry),
            temp_dir,
        ));

        let verify_interactor = Arc::new(VerifyInteractor::new(probe_port));

        Self {
            edit_interactor,
            inspect_interactor,
            verify_interactor,
            registry,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn edit_interactor(&self) -> Arc<EditInteractor> {
        Arc::clone(&self.edit_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn verify_interactor(&self) -> Arc<VerifyInteractor> {
        Arc::clone(&self.verify_interactor)
    }

    fn registry(&self) -> Arc<TempArtifactRegistry> {
        Arc::clone(&self.registry)
    }
}
