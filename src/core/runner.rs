use crate::core::client::ApiClient;
use crate::domain::model::{RequestDescriptor, RunSummary};
use crate::domain::paging::{follow_up_pages, read_paging, PaginationMode};
use crate::domain::ports::{ConfigProvider, OutputSink};
use crate::domain::script::{PaginateSpec, Script, Step, StepOutput};
use crate::utils::error::Result;

/// Fetch-and-print runner: executes scripts one request at a time.
pub struct ProbeRunner<S: OutputSink> {
    client: ApiClient,
    sink: S,
    max_pages: u64,
}

impl<S: OutputSink> ProbeRunner<S> {
    pub fn new<C: ConfigProvider>(config: &C, sink: S) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            sink,
            max_pages: config.max_pages(),
        })
    }

    pub async fn fetch(&self, req: &RequestDescriptor) -> Result<serde_json::Value> {
        self.client.get_json(req).await
    }

    pub async fn fetch_and_emit(
        &self,
        label: &str,
        req: &RequestDescriptor,
    ) -> Result<serde_json::Value> {
        let body = self.fetch(req).await?;
        self.sink.emit(label, &body).await?;
        Ok(body)
    }

    /// 依驅動回應的 paging 資訊逐頁請求，只帶 `page` 參數
    pub async fn paginate(
        &self,
        driving: &RequestDescriptor,
        driving_body: &serde_json::Value,
        spec: &PaginateSpec,
    ) -> Result<RunSummary> {
        let url = self.client.build_url(driving).to_string();
        let paging = read_paging(&url, driving_body)?;
        let pages = follow_up_pages(&url, &paging, spec.mode, spec.limit, self.max_pages)?;
        let output = spec.output;

        tracing::info!(
            "📄 Following {} page(s) of {} ({} mode, bound {:?}, limit {:?})",
            pages.end - pages.start,
            driving.path,
            spec.mode.as_str(),
            match spec.mode {
                PaginationMode::Total => paging.total,
                PaginationMode::Pages => paging.pages,
            },
            spec.limit
        );

        let mut summary = RunSummary::default();
        for page in pages {
            let req = driving.page_of(page);
            let body = self.fetch(&req).await?;
            summary.requests_issued += 1;
            self.handle_output(&req, &body, output).await?;
            if output == StepOutput::Print {
                summary.bodies_emitted += 1;
            }
        }

        Ok(summary)
    }

    pub async fn run_step(&self, step: &Step) -> Result<RunSummary> {
        let req = step.descriptor()?;
        let body = self.fetch(&req).await?;

        let mut summary = RunSummary {
            steps_executed: 1,
            requests_issued: 1,
            bodies_emitted: 0,
        };
        self.handle_output(&req, &body, step.output).await?;
        if step.output == StepOutput::Print {
            summary.bodies_emitted += 1;
        }

        if let Some(paginate) = &step.paginate {
            let pages = self.paginate(&req, &body, paginate).await?;
            summary.absorb(pages);
        }

        Ok(summary)
    }

    /// Runs every step in order; the first failure aborts the script.
    pub async fn run_script(&self, script: &Script) -> Result<RunSummary> {
        tracing::info!(
            "🚀 Running script '{}' ({} steps)",
            script.name,
            script.steps.len()
        );

        let mut summary = RunSummary::default();
        for (index, step) in script.steps.iter().enumerate() {
            tracing::debug!(
                "Step {}/{}: {}",
                index + 1,
                script.steps.len(),
                step.endpoint
            );
            summary.absorb(self.run_step(step).await?);
        }

        tracing::info!(
            "✅ Script '{}' done: {} requests, {} bodies printed",
            script.name,
            summary.requests_issued,
            summary.bodies_emitted
        );
        Ok(summary)
    }

    async fn handle_output(
        &self,
        req: &RequestDescriptor,
        body: &serde_json::Value,
        output: StepOutput,
    ) -> Result<()> {
        match output {
            StepOutput::Print => self.sink.emit(&req.to_string(), body).await,
            StepOutput::Discard => {
                tracing::debug!("Discarding body of {}", req);
                Ok(())
            }
        }
    }
}
