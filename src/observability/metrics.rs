use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub jobs_submitted_total: IntCounter,
    pub broadcasts_total: IntCounterVec,
    pub invite_emails_total: IntCounterVec,
    pub driver_responses_total: IntCounterVec,
    pub no_show_fees_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let jobs_submitted_total =
            IntCounter::new("jobs_submitted_total", "Total customer job requests submitted")
                .expect("valid jobs_submitted_total metric");

        let broadcasts_total = IntCounterVec::new(
            Opts::new("broadcasts_total", "Job broadcasts by outcome"),
            &["outcome"],
        )
        .expect("valid broadcasts_total metric");

        let invite_emails_total = IntCounterVec::new(
            Opts::new("invite_emails_total", "Invite emails by delivery outcome"),
            &["outcome"],
        )
        .expect("valid invite_emails_total metric");

        let driver_responses_total = IntCounterVec::new(
            Opts::new("driver_responses_total", "Driver invite responses by outcome"),
            &["outcome"],
        )
        .expect("valid driver_responses_total metric");

        let no_show_fees_total = IntCounterVec::new(
            Opts::new("no_show_fees_total", "Recorded no-show fees by tier"),
            &["tier"],
        )
        .expect("valid no_show_fees_total metric");

        registry
            .register(Box::new(jobs_submitted_total.clone()))
            .expect("register jobs_submitted_total");
        registry
            .register(Box::new(broadcasts_total.clone()))
            .expect("register broadcasts_total");
        registry
            .register(Box::new(invite_emails_total.clone()))
            .expect("register invite_emails_total");
        registry
            .register(Box::new(driver_responses_total.clone()))
            .expect("register driver_responses_total");
        registry
            .register(Box::new(no_show_fees_total.clone()))
            .expect("register no_show_fees_total");

        Self {
            registry,
            jobs_submitted_total,
            broadcasts_total,
            invite_emails_total,
            driver_responses_total,
            no_show_fees_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
