use crate::availability::{
    flatten_response, AvailabilitySource, DateRange, DayQuery, SearchParameters,
    SessionCredential,
};
use crate::error::{DateError, RunError};
use crate::export::{export_report, Artifact};
use crate::models::{Report, RowBatch};
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    CompletedEmpty,
}

/// Everything a run needs from the user-facing layer
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credential: SessionCredential,
    pub start_date: NaiveDate,
    pub search: SearchParameters,
}

impl RunConfig {
    pub fn new(credential: SessionCredential, start_date: NaiveDate) -> Self {
        Self {
            credential,
            start_date,
            search: SearchParameters::default(),
        }
    }
}

/// Messages for the user, in the order they were produced
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    MissingCredential,
    Progress(NaiveDate),
    DateFailed(DateError),
    Success { rows: usize },
    NoResults,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MissingCredential => f.write_str("Please enter a valid cookie to continue."),
            Notice::Progress(date) => write!(f, "Checking {}...", date.format("%Y-%m-%d")),
            Notice::DateFailed(err) => write!(f, "{}", err),
            Notice::Success { rows } => {
                write!(f, "Availability fetched successfully! ({} rows)", rows)
            }
            Notice::NoResults => f.write_str("No availability found for the selected dates."),
        }
    }
}

/// Per-date results of a run, split into what worked and what didn't
#[derive(Debug, Default)]
pub struct DayResults {
    pub batches: Vec<RowBatch>,
    pub failures: Vec<DateError>,
}

impl DayResults {
    fn from_outcomes(outcomes: Vec<Result<RowBatch, DateError>>) -> Self {
        let mut results = Self::default();
        for outcome in outcomes {
            match outcome {
                Ok(batch) => results.batches.push(batch),
                Err(err) => results.failures.push(err),
            }
        }
        results
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    /// `Completed` or `CompletedEmpty`
    pub state: RunState,
    pub report: Report,
    pub failures: Vec<DateError>,
    pub notices: Vec<Notice>,
    /// Present only when at least one row was found
    pub artifact: Option<Artifact>,
}

/// Drives one availability scan: date loop, flattening, export.
pub struct Orchestrator<S> {
    source: S,
    state: RunState,
    notices: Vec<Notice>,
}

impl<S: AvailabilitySource> Orchestrator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: RunState::Idle,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Notices produced by the most recent run, including a refused one
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Scan every date in the horizon, one request at a time.
    ///
    /// Per-date failures are reported in the outcome and never stop the scan. Only an
    /// empty credential refuses to start, leaving the orchestrator `Idle`.
    pub async fn run(&mut self, config: &RunConfig) -> Result<RunOutcome, RunError> {
        self.state = RunState::Idle;
        self.notices.clear();

        if config.credential.is_empty() {
            warn!("No session cookie supplied, not starting");
            self.notices.push(Notice::MissingCredential);
            return Err(RunError::MissingCredential);
        }

        self.state = RunState::Running;
        let range = DateRange::new(config.start_date, config.search.horizon_days);
        info!(
            "Checking {} days from {} for hotel {} via {}",
            config.search.horizon_days,
            config.start_date,
            config.search.hotel_id,
            self.source.source_name()
        );

        let mut outcomes = Vec::with_capacity(config.search.horizon_days as usize);
        for date in range {
            info!("Checking {}...", date);
            outcomes.push(self.check_date(date, config).await);
        }

        let notices = outcomes
            .iter()
            .flat_map(|outcome| match outcome {
                Ok(batch) => vec![Notice::Progress(batch.date)],
                Err(err) => vec![Notice::Progress(err.date()), Notice::DateFailed(err.clone())],
            })
            .collect::<Vec<_>>();
        self.notices.extend(notices);

        let results = DayResults::from_outcomes(outcomes);
        let mut report = Report::new();
        for batch in results.batches {
            report.append(batch);
        }

        if report.is_empty() {
            info!("No availability found across {} days", config.search.horizon_days);
            self.state = RunState::CompletedEmpty;
            self.notices.push(Notice::NoResults);
            return Ok(RunOutcome {
                state: self.state,
                report,
                failures: results.failures,
                notices: self.notices.clone(),
                artifact: None,
            });
        }

        let artifact = match export_report(&report) {
            Ok(artifact) => artifact,
            Err(err) => {
                error!("Failed to export {} rows: {}", report.len(), err);
                self.state = RunState::Idle;
                return Err(err.into());
            }
        };

        info!(
            "Found {} offers, {} dates failed",
            report.len(),
            results.failures.len()
        );
        self.state = RunState::Completed;
        self.notices.push(Notice::Success { rows: report.len() });

        Ok(RunOutcome {
            state: self.state,
            report,
            failures: results.failures,
            notices: self.notices.clone(),
            artifact: Some(artifact),
        })
    }

    async fn check_date(&self, date: NaiveDate, config: &RunConfig) -> Result<RowBatch, DateError> {
        let query = DayQuery::for_date(date).ok_or_else(|| DateError::TransportFailure {
            date,
            reason: "Stay end date is out of range".to_string(),
        })?;

        match self
            .source
            .fetch_day(&query, &config.credential, &config.search)
            .await
        {
            Ok(response) => {
                let rows = flatten_response(&response, date, config.search.hotel_id);
                debug!("{} offers on {}", rows.len(), date);
                Ok(RowBatch { date, rows })
            }
            Err(err) => {
                error!("{}", err);
                Err(err)
            }
        }
    }
}
