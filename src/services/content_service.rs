//! ContentService: reference data. Platform policies and FAQ entries are
//! administrator-maintained and readable by anyone. Stories are submitted by
//! users and become public once an administrator approves them.

use super::{
    ServiceError, ServiceResult, clean, ensure, is_present, reject_blank, require_fields,
    store_error,
};
use crate::{
    access::{Action, Principal, ResourceRef},
    models::{
        faq::{FAQ_COLUMNS, Faq},
        guide::{InheritanceScenario, InheritanceStep, inheritance_steps},
        policy::{Attitude, InheritLikelihood, POLICY_COLUMNS, PlatformPolicy},
        story::{STORY_COLUMNS, Story, StoryStatus},
    },
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct PolicyInput {
    pub platform_name: Option<String>,
    pub policy_content: Option<String>,
    pub attitude: Option<Attitude>,
    pub inherit_possibility: Option<InheritLikelihood>,
    pub legal_basis: Option<String>,
    pub customer_service: Option<String>,
    pub risk_warning: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FaqInput {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewStory {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// A platform's policy together with the steps that follow from it.
#[derive(Debug, Serialize)]
pub struct InheritanceGuide {
    pub scenario: InheritanceScenario,
    pub policy: PlatformPolicy,
    pub steps: Vec<InheritanceStep>,
}

#[derive(Clone)]
pub struct ContentService {
    db: Arc<SqlitePool>,
}

impl ContentService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    // ---- platform policies ----

    pub async fn list_policies(&self) -> ServiceResult<Vec<PlatformPolicy>> {
        let policies = sqlx::query_as::<_, PlatformPolicy>(&format!(
            "SELECT {} FROM platform_policies ORDER BY platform_name",
            POLICY_COLUMNS
        ))
        .fetch_all(&*self.db)
        .await?;
        Ok(policies)
    }

    pub async fn get_policy(&self, id: Uuid) -> ServiceResult<PlatformPolicy> {
        fetch_policy(&mut *self.db.acquire().await?, id)
            .await?
            .ok_or(ServiceError::NotFound("policy"))
    }

    pub async fn find_policy(&self, platform_name: &str) -> ServiceResult<PlatformPolicy> {
        sqlx::query_as::<_, PlatformPolicy>(&format!(
            "SELECT {} FROM platform_policies WHERE platform_name = ?",
            POLICY_COLUMNS
        ))
        .bind(platform_name.trim())
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ServiceError::NotFound("policy"))
    }

    /// Steps for claiming an account on `platform` in `scenario`.
    pub async fn inheritance_steps(
        &self,
        platform: &str,
        scenario: &str,
    ) -> ServiceResult<InheritanceGuide> {
        require_fields(&[
            ("platform", !platform.trim().is_empty()),
            ("scenario", !scenario.trim().is_empty()),
        ])?;
        let scenario: InheritanceScenario = scenario.parse().map_err(ServiceError::Validation)?;

        let policy = self.find_policy(platform).await?;
        let steps = inheritance_steps(&policy.platform_name, scenario);
        debug!(platform = %policy.platform_name, %scenario, "inheritance guide built");
        Ok(InheritanceGuide {
            scenario,
            policy,
            steps,
        })
    }

    pub async fn create_policy(
        &self,
        input: PolicyInput,
        principal: &Principal,
    ) -> ServiceResult<PlatformPolicy> {
        require_fields(&[
            ("platform_name", is_present(&input.platform_name)),
            ("policy_content", is_present(&input.policy_content)),
            ("attitude", input.attitude.is_some()),
            ("inherit_possibility", input.inherit_possibility.is_some()),
        ])?;
        ensure(principal, &ResourceRef::policy(None), Action::Create)?;

        let now = Utc::now();
        let policy = PlatformPolicy {
            id: Uuid::new_v4(),
            platform_name: input.platform_name.unwrap_or_default().trim().to_string(),
            policy_content: input.policy_content.unwrap_or_default().trim().to_string(),
            attitude: input.attitude.unwrap_or(Attitude::Ambiguous),
            inherit_possibility: input.inherit_possibility.unwrap_or(InheritLikelihood::Low),
            legal_basis: clean(input.legal_basis),
            customer_service: clean(input.customer_service),
            risk_warning: clean(input.risk_warning),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;
        sqlx::query(
            "INSERT INTO platform_policies (id, platform_name, policy_content, attitude,
                 inherit_possibility, legal_basis, customer_service, risk_warning,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(policy.id)
        .bind(&policy.platform_name)
        .bind(&policy.policy_content)
        .bind(policy.attitude)
        .bind(policy.inherit_possibility)
        .bind(&policy.legal_basis)
        .bind(&policy.customer_service)
        .bind(&policy.risk_warning)
        .bind(policy.created_at)
        .bind(policy.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;
        tx.commit().await?;

        info!(policy_id = %policy.id, platform = %policy.platform_name, "policy created");
        Ok(policy)
    }

    pub async fn update_policy(
        &self,
        id: Uuid,
        input: PolicyInput,
        principal: &Principal,
    ) -> ServiceResult<PlatformPolicy> {
        reject_blank(&[
            ("platform_name", &input.platform_name),
            ("policy_content", &input.policy_content),
        ])?;
        ensure(principal, &ResourceRef::policy(Some(id)), Action::Update)?;

        let mut tx = self.db.begin().await?;
        let mut policy = fetch_policy(&mut tx, id)
            .await?
            .ok_or(ServiceError::NotFound("policy"))?;

        if let Some(platform_name) = input.platform_name {
            policy.platform_name = platform_name.trim().to_string();
        }
        if let Some(policy_content) = input.policy_content {
            policy.policy_content = policy_content.trim().to_string();
        }
        if let Some(attitude) = input.attitude {
            policy.attitude = attitude;
        }
        if let Some(likelihood) = input.inherit_possibility {
            policy.inherit_possibility = likelihood;
        }
        if input.legal_basis.is_some() {
            policy.legal_basis = clean(input.legal_basis);
        }
        if input.customer_service.is_some() {
            policy.customer_service = clean(input.customer_service);
        }
        if input.risk_warning.is_some() {
            policy.risk_warning = clean(input.risk_warning);
        }
        policy.updated_at = Utc::now();

        sqlx::query(
            "UPDATE platform_policies
             SET platform_name = ?, policy_content = ?, attitude = ?, inherit_possibility = ?,
                 legal_basis = ?, customer_service = ?, risk_warning = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&policy.platform_name)
        .bind(&policy.policy_content)
        .bind(policy.attitude)
        .bind(policy.inherit_possibility)
        .bind(&policy.legal_basis)
        .bind(&policy.customer_service)
        .bind(&policy.risk_warning)
        .bind(policy.updated_at)
        .bind(policy.id)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;
        tx.commit().await?;

        info!(policy_id = %policy.id, "policy updated");
        Ok(policy)
    }

    pub async fn delete_policy(&self, id: Uuid, principal: &Principal) -> ServiceResult<()> {
        ensure(principal, &ResourceRef::policy(Some(id)), Action::Delete)?;
        delete_row(&self.db, "platform_policies", id, "policy").await?;
        info!(policy_id = %id, "policy deleted");
        Ok(())
    }

    // ---- FAQ ----

    pub async fn list_faqs(&self) -> ServiceResult<Vec<Faq>> {
        let faqs = sqlx::query_as::<_, Faq>(&format!(
            "SELECT {} FROM faqs ORDER BY category, display_order, created_at",
            FAQ_COLUMNS
        ))
        .fetch_all(&*self.db)
        .await?;
        Ok(faqs)
    }

    pub async fn get_faq(&self, id: Uuid) -> ServiceResult<Faq> {
        fetch_faq(&mut *self.db.acquire().await?, id)
            .await?
            .ok_or(ServiceError::NotFound("faq"))
    }

    pub async fn create_faq(&self, input: FaqInput, principal: &Principal) -> ServiceResult<Faq> {
        require_fields(&[
            ("question", is_present(&input.question)),
            ("answer", is_present(&input.answer)),
            ("category", is_present(&input.category)),
        ])?;
        ensure(principal, &ResourceRef::faq(None), Action::Create)?;

        let now = Utc::now();
        let faq = Faq {
            id: Uuid::new_v4(),
            question: input.question.unwrap_or_default().trim().to_string(),
            answer: input.answer.unwrap_or_default().trim().to_string(),
            category: input.category.unwrap_or_default().trim().to_string(),
            display_order: input.display_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;
        sqlx::query(
            "INSERT INTO faqs (id, question, answer, category, display_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(faq.id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(&faq.category)
        .bind(faq.display_order)
        .bind(faq.created_at)
        .bind(faq.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(faq_id = %faq.id, "faq created");
        Ok(faq)
    }

    pub async fn update_faq(
        &self,
        id: Uuid,
        input: FaqInput,
        principal: &Principal,
    ) -> ServiceResult<Faq> {
        reject_blank(&[
            ("question", &input.question),
            ("answer", &input.answer),
            ("category", &input.category),
        ])?;
        ensure(principal, &ResourceRef::faq(Some(id)), Action::Update)?;

        let mut tx = self.db.begin().await?;
        let mut faq = fetch_faq(&mut tx, id)
            .await?
            .ok_or(ServiceError::NotFound("faq"))?;

        if let Some(question) = input.question {
            faq.question = question.trim().to_string();
        }
        if let Some(answer) = input.answer {
            faq.answer = answer.trim().to_string();
        }
        if let Some(category) = input.category {
            faq.category = category.trim().to_string();
        }
        if let Some(order) = input.display_order {
            faq.display_order = order;
        }
        faq.updated_at = Utc::now();

        sqlx::query(
            "UPDATE faqs SET question = ?, answer = ?, category = ?, display_order = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(&faq.category)
        .bind(faq.display_order)
        .bind(faq.updated_at)
        .bind(faq.id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(faq_id = %faq.id, "faq updated");
        Ok(faq)
    }

    pub async fn delete_faq(&self, id: Uuid, principal: &Principal) -> ServiceResult<()> {
        ensure(principal, &ResourceRef::faq(Some(id)), Action::Delete)?;
        delete_row(&self.db, "faqs", id, "faq").await?;
        info!(faq_id = %id, "faq deleted");
        Ok(())
    }

    // ---- stories ----

    /// Submit a story for moderation. Any signed-in user may do this.
    pub async fn submit_story(&self, input: NewStory, principal: &Principal) -> ServiceResult<Story> {
        require_fields(&[
            ("title", is_present(&input.title)),
            ("content", is_present(&input.content)),
            ("author", is_present(&input.author)),
            ("category", is_present(&input.category)),
        ])?;
        ensure(principal, &ResourceRef::new_story(), Action::Create)?;

        let now = Utc::now();
        let story = Story {
            id: Uuid::new_v4(),
            title: input.title.unwrap_or_default().trim().to_string(),
            content: input.content.unwrap_or_default().trim().to_string(),
            author: clean(input.author),
            category: clean(input.category),
            image_url: clean(input.image_url),
            status: StoryStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;
        sqlx::query(
            "INSERT INTO stories (id, title, content, author, category, image_url, status,
                                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(story.id)
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.author)
        .bind(&story.category)
        .bind(&story.image_url)
        .bind(story.status)
        .bind(story.created_at)
        .bind(story.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(story_id = %story.id, principal_id = ?principal.id(), "story submitted");
        Ok(story)
    }

    /// Newest first. Everyone but administrators sees approved stories only,
    /// whatever `status` they ask for.
    pub async fn list_stories(
        &self,
        principal: &Principal,
        status: Option<StoryStatus>,
    ) -> ServiceResult<Vec<Story>> {
        let status = if principal.is_admin() {
            status
        } else {
            Some(StoryStatus::Approved)
        };

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM stories", STORY_COLUMNS));
        if let Some(status) = status {
            select.push(" WHERE status = ");
            select.push_bind(status);
        }
        select.push(" ORDER BY created_at DESC");
        let stories: Vec<Story> = select.build_query_as().fetch_all(&*self.db).await?;
        Ok(stories)
    }

    /// Unpublished stories are reported as missing to non-administrators.
    pub async fn get_story(&self, id: Uuid, principal: &Principal) -> ServiceResult<Story> {
        let story = fetch_story(&mut *self.db.acquire().await?, id)
            .await?
            .ok_or(ServiceError::NotFound("story"))?;
        ensure(principal, &ResourceRef::story(&story), Action::Read)
            .map_err(|_| ServiceError::NotFound("story"))?;
        Ok(story)
    }

    pub async fn approve_story(&self, id: Uuid, principal: &Principal) -> ServiceResult<Story> {
        self.moderate_story(id, StoryStatus::Approved, principal).await
    }

    pub async fn reject_story(&self, id: Uuid, principal: &Principal) -> ServiceResult<Story> {
        self.moderate_story(id, StoryStatus::Rejected, principal).await
    }

    async fn moderate_story(
        &self,
        id: Uuid,
        status: StoryStatus,
        principal: &Principal,
    ) -> ServiceResult<Story> {
        let mut tx = self.db.begin().await?;
        let mut story = fetch_story(&mut tx, id)
            .await?
            .ok_or(ServiceError::NotFound("story"))?;
        ensure(principal, &ResourceRef::story(&story), Action::Update)?;

        if story.status == status {
            debug!(story_id = %id, ?status, "story already moderated");
            return Ok(story);
        }
        story.status = status;
        story.updated_at = Utc::now();
        sqlx::query("UPDATE stories SET status = ?, updated_at = ? WHERE id = ?")
            .bind(story.status)
            .bind(story.updated_at)
            .bind(story.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(story_id = %story.id, ?status, "story moderated");
        Ok(story)
    }

    pub async fn delete_story(&self, id: Uuid, principal: &Principal) -> ServiceResult<()> {
        let mut tx = self.db.begin().await?;
        let story = fetch_story(&mut tx, id)
            .await?
            .ok_or(ServiceError::NotFound("story"))?;
        ensure(principal, &ResourceRef::story(&story), Action::Delete)?;

        sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(story.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(story_id = %id, "story deleted");
        Ok(())
    }
}

async fn fetch_policy(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> sqlx::Result<Option<PlatformPolicy>> {
    sqlx::query_as::<_, PlatformPolicy>(&format!(
        "SELECT {} FROM platform_policies WHERE id = ?",
        POLICY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

async fn fetch_faq(conn: &mut SqliteConnection, id: Uuid) -> sqlx::Result<Option<Faq>> {
    sqlx::query_as::<_, Faq>(&format!("SELECT {} FROM faqs WHERE id = ?", FAQ_COLUMNS))
        .bind(id)
        .fetch_optional(conn)
        .await
}

async fn fetch_story(conn: &mut SqliteConnection, id: Uuid) -> sqlx::Result<Option<Story>> {
    sqlx::query_as::<_, Story>(&format!(
        "SELECT {} FROM stories WHERE id = ?",
        STORY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Single-row delete of unowned reference data.
async fn delete_row(
    db: &SqlitePool,
    table: &'static str,
    id: Uuid,
    what: &'static str,
) -> ServiceResult<()> {
    let mut tx = db.begin().await?;
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound(what));
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{seed_user, state};

    fn wechat_policy() -> PolicyInput {
        PolicyInput {
            platform_name: Some("微信".into()),
            policy_content: Some("Accounts are personal and not transferable.".into()),
            attitude: Some(Attitude::Prohibited),
            inherit_possibility: Some(InheritLikelihood::Low),
            ..PolicyInput::default()
        }
    }

    fn story_input(title: &str) -> NewStory {
        NewStory {
            title: Some(title.into()),
            content: Some("We found the photos in the cloud drive.".into()),
            author: Some("Li".into()),
            category: Some("memory".into()),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn policies_are_admin_written_and_publicly_read() {
        let state = state().await;
        let alice = Principal::from(&seed_user(&state, "alice", false).await);
        let admin = Principal::from(&seed_user(&state, "root", true).await);

        let err = state
            .content
            .create_policy(wechat_policy(), &alice)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let created = state
            .content
            .create_policy(wechat_policy(), &admin)
            .await
            .unwrap();
        let dup = state
            .content
            .create_policy(wechat_policy(), &admin)
            .await
            .unwrap_err();
        assert!(matches!(dup, ServiceError::Conflict { field: "platform_name" }));

        let found = state.content.find_policy("微信").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.attitude, Attitude::Prohibited);
        assert_eq!(state.content.list_policies().await.unwrap().len(), 1);

        let missing = state.content.get_policy(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound("policy")));

        state
            .content
            .delete_policy(created.id, &admin)
            .await
            .unwrap();
        assert!(state.content.list_policies().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn policy_enums_accept_chinese_labels() {
        let input: PolicyInput = serde_json::from_value(serde_json::json!({
            "platform_name": "支付宝",
            "policy_content": "Balance may be claimed by heirs.",
            "attitude": "有限支持",
            "inherit_possibility": "中"
        }))
        .unwrap();
        assert_eq!(input.attitude, Some(Attitude::LimitedSupport));
        assert_eq!(input.inherit_possibility, Some(InheritLikelihood::Medium));
    }

    #[tokio::test]
    async fn faqs_are_ordered_by_category_then_position() {
        let state = state().await;
        let admin = Principal::from(&seed_user(&state, "root", true).await);
        for (category, order, question) in [
            ("wills", 2, "Can I change my will?"),
            ("assets", 1, "What counts as an asset?"),
            ("wills", 1, "What is a digital will?"),
        ] {
            state
                .content
                .create_faq(
                    FaqInput {
                        question: Some(question.into()),
                        answer: Some("See the guide.".into()),
                        category: Some(category.into()),
                        display_order: Some(order),
                    },
                    &admin,
                )
                .await
                .unwrap();
        }

        let questions: Vec<String> = state
            .content
            .list_faqs()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.question)
            .collect();
        assert_eq!(
            questions,
            [
                "What counts as an asset?",
                "What is a digital will?",
                "Can I change my will?"
            ]
        );

        let err = state
            .content
            .create_faq(FaqInput::default(), &Principal::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn stories_are_public_only_after_approval() {
        let state = state().await;
        let alice = Principal::from(&seed_user(&state, "alice", false).await);
        let admin = Principal::from(&seed_user(&state, "root", true).await);

        let err = state
            .content
            .submit_story(story_input("Anonymous"), &Principal::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let kept = state
            .content
            .submit_story(story_input("Grandma's blog"), &alice)
            .await
            .unwrap();
        let dropped = state
            .content
            .submit_story(story_input("Spam"), &alice)
            .await
            .unwrap();
        assert_eq!(kept.status, StoryStatus::Pending);

        assert!(state
            .content
            .list_stories(&Principal::Anonymous, None)
            .await
            .unwrap()
            .is_empty());
        let hidden = state
            .content
            .get_story(kept.id, &Principal::Anonymous)
            .await
            .unwrap_err();
        assert!(matches!(hidden, ServiceError::NotFound("story")));

        let err = state.content.approve_story(kept.id, &alice).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        state.content.approve_story(kept.id, &admin).await.unwrap();
        state.content.reject_story(dropped.id, &admin).await.unwrap();

        let public = state
            .content
            .list_stories(&Principal::Anonymous, Some(StoryStatus::Rejected))
            .await
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, kept.id);

        let rejected = state
            .content
            .list_stories(&admin, Some(StoryStatus::Rejected))
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].id, dropped.id);

        assert!(state
            .content
            .get_story(kept.id, &Principal::Anonymous)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn story_submission_requires_author_and_category() {
        let state = state().await;
        let alice = Principal::from(&seed_user(&state, "alice", false).await);
        let err = state
            .content
            .submit_story(
                NewStory {
                    title: Some("t".into()),
                    content: Some("c".into()),
                    ..NewStory::default()
                },
                &alice,
            )
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => {
                assert_eq!(msg, "missing required fields: author, category")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn inheritance_guide_follows_the_scenario() {
        let state = state().await;
        let admin = Principal::from(&seed_user(&state, "root", true).await);
        state
            .content
            .create_policy(wechat_policy(), &admin)
            .await
            .unwrap();

        let titles = |guide: &InheritanceGuide| -> Vec<String> {
            guide.steps.iter().map(|s| s.title.clone()).collect()
        };

        let full = state
            .content
            .inheritance_steps("微信", "will-and-password")
            .await
            .unwrap();
        assert_eq!(full.policy.attitude, Attitude::Prohibited);
        assert_eq!(full.scenario, InheritanceScenario::WillAndPassword);
        assert_eq!(titles(&full)[3], "Await review");

        let will_only = state
            .content
            .inheritance_steps(" 微信 ", "scenario2")
            .await
            .unwrap();
        assert_eq!(titles(&will_only)[2], "Request account recovery");
        assert_eq!(titles(&will_only)[3], "Legal action");

        let neither = state
            .content
            .inheritance_steps("微信", "neither")
            .await
            .unwrap();
        assert_eq!(
            titles(&neither),
            [
                "Collect supporting evidence",
                "Contact 微信 support",
                "Seek legal advice",
                "Court proceedings"
            ]
        );
        assert!(neither.steps[1]
            .materials
            .contains(&"微信 customer service hotline".to_string()));
    }

    #[tokio::test]
    async fn inheritance_guide_rejects_unknown_input() {
        let state = state().await;
        let admin = Principal::from(&seed_user(&state, "root", true).await);
        state
            .content
            .create_policy(wechat_policy(), &admin)
            .await
            .unwrap();

        let err = state
            .content
            .inheritance_steps("MySpace", "will-only")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("policy")));

        let err = state
            .content
            .inheritance_steps("微信", "lost-phone")
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => assert!(msg.contains("invalid scenario"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }

        let err = state
            .content
            .inheritance_steps("微信", "")
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(msg) => assert_eq!(msg, "missing required fields: scenario"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
