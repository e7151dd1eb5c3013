//! Job board: candidate search and apply, recruiter post management.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use hireloop_api::models::{
    ApplicationAnswer, JobApplication, JobApplicationRequest, JobPost, JobPostRequest, JobQuery,
    QuestionKind,
};
use hireloop_api::ApiClient;
use hireloop_runtime::{Debouncer, Scope, ScopeHandle};

use crate::error::{DashboardError, DashboardResult};
use crate::within;

pub const MAX_QUESTIONS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobPostError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("a job post can ask at most {MAX_QUESTIONS} questions, got {0}")]
    TooManyQuestions(usize),
    #[error("question {0} is empty")]
    BlankQuestion(usize),
    #[error("salary minimum is above the maximum")]
    InvalidSalary,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("expected {expected} answers, got {got}")]
    AnswerCount { expected: usize, got: usize },
    #[error("an answer is required for \"{0}\"")]
    MissingAnswer(String),
    #[error("\"{0}\" expects a number")]
    NotANumber(String),
    #[error("\"{0}\" expects yes or no")]
    NotYesNo(String),
}

pub fn validate_job_post(post: &JobPostRequest) -> Result<(), JobPostError> {
    let required = [
        ("title", &post.title),
        ("company", &post.company),
        ("location", &post.location),
        ("description", &post.description),
    ];
    if let Some(&(name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(JobPostError::MissingField(name));
    }

    if post.questions.len() > MAX_QUESTIONS {
        return Err(JobPostError::TooManyQuestions(post.questions.len()));
    }
    if let Some(index) = post
        .questions
        .iter()
        .position(|question| question.question.trim().is_empty())
    {
        return Err(JobPostError::BlankQuestion(index + 1));
    }

    match &post.salary {
        Some(salary) if salary.min > salary.max => Err(JobPostError::InvalidSalary),
        _ => Ok(()),
    }
}

/// Pair `answers` with the post's questions, in order.
pub fn build_application(
    job: &JobPost,
    answers: Vec<String>,
    resume_url: Option<String>,
) -> Result<JobApplicationRequest, ApplicationError> {
    if answers.len() != job.questions.len() {
        return Err(ApplicationError::AnswerCount {
            expected: job.questions.len(),
            got: answers.len(),
        });
    }

    let answers = job
        .questions
        .iter()
        .zip(answers)
        .map(|(question, answer)| {
            let answer = answer.trim().to_string();
            if answer.is_empty() {
                if question.required {
                    return Err(ApplicationError::MissingAnswer(question.question.clone()));
                }
            } else {
                match question.kind {
                    QuestionKind::Number if answer.parse::<f64>().is_err() => {
                        return Err(ApplicationError::NotANumber(question.question.clone()));
                    }
                    QuestionKind::YesNo
                        if !matches!(answer.to_ascii_lowercase().as_str(), "yes" | "no") =>
                    {
                        return Err(ApplicationError::NotYesNo(question.question.clone()));
                    }
                    _ => {}
                }
            }
            Ok(ApplicationAnswer {
                question: question.question.clone(),
                answer,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(JobApplicationRequest { resume_url, answers })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobListing {
    pub query: JobQuery,
    pub jobs: Vec<JobPost>,
    pub has_more: bool,
    pub error: Option<String>,
}

/// Candidate side of the board.
pub struct JobBoard {
    api: ApiClient,
    scope: Scope,
    debouncer: Debouncer,
    listing: Arc<watch::Sender<JobListing>>,
}

impl JobBoard {
    pub fn new(api: ApiClient, debounce: Duration) -> Self {
        let (listing, _) = watch::channel(JobListing::default());
        Self {
            api,
            scope: Scope::new(),
            debouncer: Debouncer::new(debounce),
            listing: Arc::new(listing),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobListing> {
        self.listing.subscribe()
    }

    pub fn listing(&self) -> JobListing {
        self.listing.borrow().clone()
    }

    pub async fn load(&self, query: JobQuery) -> DashboardResult<()> {
        load_jobs(&self.api, &self.listing, &self.scope.handle(), query).await
    }

    /// Debounced free-text search.
    pub fn search(&self, text: &str) {
        let text = text.trim();
        let mut query = self.listing.borrow().query.clone();
        query.search = (!text.is_empty()).then(|| text.to_string());
        query.page = None;
        self.listing.send_modify(|listing| listing.query = query.clone());

        let api = self.api.clone();
        let listing = self.listing.clone();
        let scope = self.scope.handle();
        self.debouncer.schedule(async move {
            let _ = load_jobs(&api, &listing, &scope, query).await;
        });
    }

    pub async fn apply(
        &self,
        job: &JobPost,
        answers: Vec<String>,
        resume_url: Option<String>,
    ) -> DashboardResult<JobApplication> {
        let request = build_application(job, answers, resume_url)?;
        let application =
            within(&self.scope.handle(), self.api.apply_to_job(&job.id, &request)).await?;
        info!(job = %job.id, application = %application.id, "applied to job");
        Ok(application)
    }

    pub fn close(&self) {
        self.debouncer.cancel();
        self.scope.close();
    }
}

async fn load_jobs(
    api: &ApiClient,
    listing: &watch::Sender<JobListing>,
    scope: &ScopeHandle,
    query: JobQuery,
) -> DashboardResult<()> {
    match within(scope, api.jobs(&query)).await {
        Ok(page) => {
            listing.send_modify(|listing| {
                if listing.query.search != query.search
                    || listing.query.location != query.location
                {
                    return;
                }
                listing.query = query.clone();
                listing.has_more = page.has_more();
                listing.jobs = page.items;
                listing.error = None;
            });
            Ok(())
        }
        Err(DashboardError::Closed) => Err(DashboardError::Closed),
        Err(err) => {
            warn!(error = %err, "job listing failed");
            listing.send_modify(|listing| listing.error = Some(err.to_string()));
            Err(err)
        }
    }
}

/// Recruiter side: the caller's own posts.
pub struct RecruiterJobs {
    api: ApiClient,
    scope: Scope,
    posts: Arc<watch::Sender<Vec<JobPost>>>,
}

impl RecruiterJobs {
    pub fn new(api: ApiClient) -> Self {
        let (posts, _) = watch::channel(Vec::new());
        Self {
            api,
            scope: Scope::new(),
            posts: Arc::new(posts),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<JobPost>> {
        self.posts.subscribe()
    }

    pub fn posts(&self) -> Vec<JobPost> {
        self.posts.borrow().clone()
    }

    pub async fn refresh(&self) -> DashboardResult<()> {
        let posts = within(&self.scope.handle(), self.api.recruiter_jobs()).await?;
        self.posts.send_replace(posts);
        Ok(())
    }

    pub async fn create(&self, post: &JobPostRequest) -> DashboardResult<JobPost> {
        validate_job_post(post)?;
        let created = within(&self.scope.handle(), self.api.create_job(post)).await?;
        info!(job = %created.id, "job post created");
        self.posts.send_modify(|posts| posts.insert(0, created.clone()));
        Ok(created)
    }

    pub async fn update(&self, id: &str, post: &JobPostRequest) -> DashboardResult<JobPost> {
        validate_job_post(post)?;
        let updated = within(&self.scope.handle(), self.api.update_job(id, post)).await?;
        self.posts.send_modify(|posts| {
            if let Some(existing) = posts.iter_mut().find(|existing| existing.id == updated.id) {
                *existing = updated.clone();
            }
        });
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> DashboardResult<()> {
        within(&self.scope.handle(), self.api.delete_job(id)).await?;
        info!(job = %id, "job post deleted");
        self.posts.send_modify(|posts| posts.retain(|post| post.id != id));
        Ok(())
    }

    pub async fn applications(&self, job_id: &str) -> DashboardResult<Vec<JobApplication>> {
        within(&self.scope.handle(), self.api.job_applications(job_id)).await
    }

    pub fn close(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hireloop_api::models::{ApplicationQuestion, EmploymentType, SalaryRange};

    fn question(text: &str, kind: QuestionKind, required: bool) -> ApplicationQuestion {
        ApplicationQuestion {
            question: text.to_string(),
            kind,
            required,
        }
    }

    fn post_request(questions: Vec<ApplicationQuestion>) -> JobPostRequest {
        JobPostRequest {
            title: "Rust Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            employment_type: EmploymentType::FullTime,
            description: "Build the matching engine".into(),
            salary: None,
            skills: vec!["rust".into()],
            questions,
        }
    }

    fn job(questions: Vec<ApplicationQuestion>) -> JobPost {
        JobPost {
            id: "j1".into(),
            recruiter_id: "r1".into(),
            title: "Rust Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            employment_type: EmploymentType::FullTime,
            description: "Build the matching engine".into(),
            salary: None,
            skills: Vec::new(),
            questions,
            posted_at: Utc::now(),
        }
    }

    #[test]
    fn test_job_post_limits() {
        assert!(validate_job_post(&post_request(Vec::new())).is_ok());

        let ten = (0..MAX_QUESTIONS)
            .map(|i| question(&format!("Q{i}"), QuestionKind::Text, false))
            .collect::<Vec<_>>();
        assert!(validate_job_post(&post_request(ten.clone())).is_ok());

        let mut eleven = ten;
        eleven.push(question("one more", QuestionKind::Text, false));
        assert_eq!(
            validate_job_post(&post_request(eleven)),
            Err(JobPostError::TooManyQuestions(11))
        );
    }

    #[test]
    fn test_job_post_fields() {
        let mut post = post_request(vec![question("  ", QuestionKind::Text, true)]);
        assert_eq!(validate_job_post(&post), Err(JobPostError::BlankQuestion(1)));

        post.questions.clear();
        post.title = " ".into();
        assert_eq!(validate_job_post(&post), Err(JobPostError::MissingField("title")));

        post.title = "Rust Engineer".into();
        post.salary = Some(SalaryRange {
            min: 200,
            max: 100,
            currency: "EUR".into(),
        });
        assert_eq!(validate_job_post(&post), Err(JobPostError::InvalidSalary));
    }

    #[test]
    fn test_application_needs_one_answer_per_question() {
        let job = job(vec![
            question("Years of Rust?", QuestionKind::Number, true),
            question("Can you relocate?", QuestionKind::YesNo, true),
            question("Anything else?", QuestionKind::Text, false),
        ]);

        assert_eq!(
            build_application(&job, vec!["5".into()], None),
            Err(ApplicationError::AnswerCount {
                expected: 3,
                got: 1
            })
        );
        assert_eq!(
            build_application(&job, vec!["".into(), "yes".into(), "".into()], None),
            Err(ApplicationError::MissingAnswer("Years of Rust?".into()))
        );
        assert_eq!(
            build_application(&job, vec!["five".into(), "yes".into(), "".into()], None),
            Err(ApplicationError::NotANumber("Years of Rust?".into()))
        );
        assert_eq!(
            build_application(&job, vec!["5".into(), "maybe".into(), "".into()], None),
            Err(ApplicationError::NotYesNo("Can you relocate?".into()))
        );

        let request = build_application(&job, vec![" 5 ".into(), "Yes".into(), "".into()], None)
            .expect("valid application");
        assert_eq!(request.answers.len(), 3);
        assert_eq!(request.answers[0].answer, "5");
        assert_eq!(request.answers[2].answer, "");
    }
}
