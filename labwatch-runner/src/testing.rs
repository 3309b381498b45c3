//! Scripted scheduler double shared by the runner tests

use async_trait::async_trait;
use labwatch_client::{ClientError, Result, Scheduler};
use labwatch_core::domain::job::{JobId, RecipeId, Status};
use labwatch_core::domain::results::{JobResults, RecipeRequest, RecipeResults, ResultsDocument};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

enum Reply {
    Document(ResultsDocument),
    Unparseable(String),
}

#[derive(Default)]
struct State {
    /// Per-id replies; the last one repeats once the queue is down to it
    replies: HashMap<String, VecDeque<Reply>>,
    /// Outcomes handed out to successive submissions
    submissions: VecDeque<Option<JobId>>,
    submitted: Vec<(String, Option<String>)>,
    queries: Vec<String>,
}

/// In-memory [`Scheduler`] replaying scripted answers
#[derive(Default)]
pub struct ScriptedScheduler {
    state: Mutex<State>,
}

impl ScriptedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a results document for `id`
    pub fn respond(&self, id: &str, document: ResultsDocument) -> &Self {
        self.push_reply(id, Reply::Document(document));
        self
    }

    /// Queues an unparseable answer for `id`
    pub fn respond_garbage(&self, id: &str) -> &Self {
        self.push_reply(id, Reply::Unparseable(format!("garbage for {}", id)));
        self
    }

    /// Next submission is acknowledged with `job_id`
    pub fn accept_submission(&self, job_id: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .submissions
            .push_back(Some(JobId::new(job_id)));
        self
    }

    /// Next submission is acknowledged without a job id
    pub fn reject_submission(&self) -> &Self {
        self.state.lock().unwrap().submissions.push_back(None);
        self
    }

    /// Documents submitted so far, with the owner they were submitted for
    pub fn submitted(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// Ids queried so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    fn push_reply(&self, id: &str, reply: Reply) {
        self.state
            .lock()
            .unwrap()
            .replies
            .entry(id.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl Scheduler for ScriptedScheduler {
    async fn submit(&self, document: &str, owner: Option<&str>) -> Result<JobId> {
        let mut state = self.state.lock().unwrap();
        state
            .submitted
            .push((document.to_string(), owner.map(str::to_string)));

        match state.submissions.pop_front().flatten() {
            Some(job_id) => Ok(job_id),
            None => Err(ClientError::SubmissionFailed {
                acknowledgment: String::new(),
            }),
        }
    }

    async fn fetch_results(&self, id: &str) -> Result<ResultsDocument> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(id.to_string());

        let queue = state
            .replies
            .get_mut(id)
            .ok_or_else(|| ClientError::ParseError(format!("no reply scripted for {}", id)))?;

        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().map(|reply| match reply {
                Reply::Document(doc) => Reply::Document(doc.clone()),
                Reply::Unparseable(msg) => Reply::Unparseable(msg.clone()),
            })
        };

        match reply {
            Some(Reply::Document(doc)) => Ok(doc),
            Some(Reply::Unparseable(msg)) => Err(ClientError::ParseError(msg)),
            None => Err(ClientError::ParseError(format!("no reply scripted for {}", id))),
        }
    }
}

/// A recipe with a minimal request body
pub fn recipe(id: &str, status: Status, result: &str, system: Option<&str>) -> RecipeResults {
    RecipeResults {
        id: RecipeId::from_numeric(id),
        status,
        result: Some(result.to_string()),
        system: system.map(str::to_string),
        request: RecipeRequest {
            attributes: vec![("ks_meta".to_string(), "method=nfs".to_string())],
            host_requires: Some(
                r#"<hostRequires><system_type value="Machine"/></hostRequires>"#.to_string(),
            ),
            elements: vec![r#"<task name="/kernel/install" role="STANDALONE"/>"#.to_string()],
        },
    }
}

/// A job-rooted document holding the given recipes
pub fn job(id: &str, result: &str, whiteboard: &str, recipes: Vec<RecipeResults>) -> ResultsDocument {
    ResultsDocument::Job(JobResults {
        id: Some(JobId::from_numeric(id)),
        status: Status::Running,
        result: Some(result.to_string()),
        whiteboard: Some(whiteboard.to_string()),
        recipes,
    })
}

/// A recipe-rooted document
pub fn recipe_doc(id: &str, status: Status, result: &str, system: Option<&str>) -> ResultsDocument {
    ResultsDocument::Recipe(recipe(id, status, result, system))
}
