//! Two-step import pipeline
//!
//! `parse` reads the answer file, extracts and matches people, and parks the
//! result in the session cache. `commit` applies the operator's per-person
//! decisions, validates every entity against the graph invariants, and
//! writes in dependency order.

use crate::config::ImportConfig;
use crate::error::{ImportError, PartialImport, RoleCreationError};
use crate::extract::{extract_people, Extraction};
use crate::preview::{build_preview, ImportPreview};
use crate::session::{ImportSession, MokaSessionCache, SessionCache};
use crate::transform::{DomainTransformer, PersonDecision, TransformOutput};
use chrono::Utc;
use estate_fields::{AnswerSetParser, FieldTable};
use estate_match::{MatchCandidate, MatchOptions};
use estate_model::{
    Client, EntityLookup, GraphValidator, PersonRegistry, PlanId, PlanStatus, PlanStore,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Result of the parse step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// Handle for the commit step
    pub session_id: String,
    /// Normalized preview for review
    pub preview: ImportPreview,
    /// Registry suggestions per extracted name
    pub matches: IndexMap<String, Vec<MatchCandidate>>,
}

/// Result of a committed import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    /// The plan and every fatal-stage entity were written
    pub success: bool,
    /// Created plan
    pub plan_id: PlanId,
    /// Status the plan was created in
    pub plan_status: PlanStatus,
    /// New people written
    pub people_created: usize,
    /// New client records written
    pub clients_created: usize,
    /// Relationships written
    pub relationships_created: usize,
    /// Roles written
    pub roles_created: usize,
    /// Roles that could not be written
    pub role_errors: Vec<String>,
}

/// Answer-file import pipeline
pub struct ImportPipeline<S, C = MokaSessionCache> {
    store: Arc<S>,
    cache: C,
    config: ImportConfig,
    parser: AnswerSetParser,
    transformer: DomainTransformer,
}

impl<S> ImportPipeline<S, MokaSessionCache>
where
    S: PersonRegistry + PlanStore + EntityLookup,
{
    /// Pipeline with an in-process session cache
    #[must_use]
    pub fn new(store: Arc<S>, config: ImportConfig) -> Self {
        Self::with_cache(store, MokaSessionCache::default(), config)
    }
}

impl<S, C> ImportPipeline<S, C>
where
    S: PersonRegistry + PlanStore + EntityLookup,
    C: SessionCache,
{
    /// Pipeline with a caller-supplied session cache
    #[must_use]
    pub fn with_cache(store: Arc<S>, cache: C, config: ImportConfig) -> Self {
        Self {
            parser: AnswerSetParser::new().with_max_bytes(config.max_markup_bytes),
            transformer: DomainTransformer::new(config.second_principal_suffix.clone()),
            store,
            cache,
            config,
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Parse an answer file into a field table
    ///
    /// # Errors
    ///
    /// [`ImportError::Parse`] for malformed markup.
    pub fn fields(&self, markup: &str) -> Result<FieldTable, ImportError> {
        Ok(self.parser.parse(markup)?)
    }

    /// Extract the people an answer file names, without matching them
    ///
    /// # Errors
    ///
    /// [`ImportError::Parse`] for malformed markup.
    pub fn extract(&self, markup: &str) -> Result<(FieldTable, Extraction), ImportError> {
        let table = self.fields(markup)?;
        let extraction = extract_people(&table, &self.config.second_principal_suffix);
        Ok((table, extraction))
    }

    /// Parse, extract, and match; park the result under a new session id
    ///
    /// # Errors
    ///
    /// Parse, registry, or session cache failures.
    pub async fn parse(&self, markup: &str) -> Result<ParseResult, ImportError> {
        let (table, extraction) = self.extract(markup)?;
        tracing::info!(fields = table.len(), people = extraction.extractor.len(), "answer file parsed");

        let matches = extraction
            .extractor
            .find_matches_with(
                self.store.as_ref(),
                MatchOptions {
                    limit: self.config.match_limit,
                    min_confidence: self.config.min_match_confidence,
                },
            )
            .await?;

        let preview = build_preview(&table, &extraction, &self.config.second_principal_suffix);
        let session = ImportSession {
            session_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            fields: table,
            extraction,
        };
        self.cache
            .set(
                &ImportSession::cache_key(&session.session_id),
                session.encode()?,
                self.config.session_ttl(),
            )
            .await?;

        tracing::info!(session_id = %session.session_id, "import session opened");
        Ok(ParseResult {
            session_id: session.session_id,
            preview,
            matches,
        })
    }

    /// Apply decisions for a parsed session and persist the plan.
    ///
    /// The session is removed on success and kept on failure so the
    /// decisions can be resubmitted until it expires. Once everything is
    /// written, a failure to remove the session is only logged.
    ///
    /// # Errors
    ///
    /// [`ImportError::SessionExpired`] for an unknown or expired session,
    /// [`ImportError::Transform`] before anything is written, and
    /// [`ImportError::Persistence`] (with the ids written so far) when a
    /// person, client, relationship, plan, trust, will, or document write fails.
    pub async fn commit(
        &self,
        session_id: &str,
        decisions: &IndexMap<String, PersonDecision>,
    ) -> Result<ImportResult, ImportError> {
        let key = ImportSession::cache_key(session_id);
        let raw = self
            .cache
            .get(&key)
            .await?
            .ok_or_else(|| ImportError::SessionExpired {
                session_id: session_id.to_string(),
            })?;
        let session = ImportSession::decode(&raw)?;

        let output = self
            .transformer
            .transform(&session.fields, &session.extraction, decisions, session_id)?;
        if !output.unresolved.is_empty() {
            tracing::warn!(names = ?output.unresolved, "roles dropped for people without a decision");
        }

        let result = self.persist(output).await?;
        // Everything is written; a stale session only lingers until its TTL.
        if let Err(error) = self.cache.delete(&key).await {
            tracing::warn!(session_id, %error, "committed session could not be removed");
        }

        tracing::info!(
            plan_id = %result.plan_id,
            people = result.people_created,
            roles = result.roles_created,
            role_errors = result.role_errors.len(),
            "import committed"
        );
        Ok(result)
    }

    async fn persist(&self, output: TransformOutput) -> Result<ImportResult, ImportError> {
        let store = self.store.as_ref();
        let validator = GraphValidator::new(store);
        let mut partial = PartialImport::default();

        macro_rules! fatal {
            ($stage:literal, $write:expr) => {
                match $write.await {
                    Ok(id) => id,
                    Err(source) => {
                        tracing::error!(stage = $stage, error = %source, "import aborted");
                        return Err(ImportError::Persistence {
                            stage: $stage,
                            source,
                            partial: Box::new(partial),
                        });
                    }
                }
            };
        }

        for person in output.new_people {
            let id = fatal!("person", store.insert_person(person));
            partial.people.push(id);
        }

        let mut clients_created = 0;
        for &person_id in &output.principal_ids {
            let existing = fatal!("client", store.client_for_person(person_id));
            if existing.is_none() {
                let client = Client::new(person_id);
                fatal!("client", validator.check_client(&client));
                let id = fatal!("client", store.insert_client(client));
                partial.clients.push(id);
                clients_created += 1;
            }
        }

        for relationship in output.relationships {
            fatal!("relationship", validator.check_relationship(&relationship));
            let id = fatal!("relationship", store.insert_relationship(relationship));
            partial.relationships.push(id);
        }

        let plan_status = output.plan.status();
        fatal!("plan", validator.check_plan(&output.plan));
        let plan_id = fatal!("plan", store.insert_plan(output.plan));
        partial.plan_id = Some(plan_id);

        if let Some(trust) = output.trust {
            fatal!("trust", validator.check_trust(&trust));
            partial.trust_id = Some(fatal!("trust", store.insert_trust(trust)));
        }

        for will in output.wills {
            fatal!("will", validator.check_will(&will));
            let id = fatal!("will", store.insert_will(will));
            partial.wills.push(id);
        }

        for document in output.documents {
            fatal!("document", validator.check_document(&document));
            let id = fatal!("document", store.insert_document(document));
            partial.documents.push(id);
        }

        let mut role_errors = Vec::new();
        for role in output.roles {
            let (role_type, person_id) = (role.role_type, role.person_id);
            let written = match validator.check_role(&role).await {
                Ok(()) => store.insert_role(role).await,
                Err(e) => Err(e),
            };
            match written {
                Ok(id) => partial.roles.push(id),
                Err(source) => {
                    let err = RoleCreationError {
                        role_type,
                        person_id,
                        source,
                    };
                    tracing::warn!(error = %err, "role not created");
                    role_errors.push(err.to_string());
                }
            }
        }

        Ok(ImportResult {
            success: true,
            plan_id,
            plan_status,
            people_created: partial.people.len(),
            clients_created,
            relationships_created: partial.relationships.len(),
            roles_created: partial.roles.len(),
            role_errors,
        })
    }
}

/// Decisions that create every extracted person
#[must_use]
pub fn create_all(extraction: &Extraction) -> IndexMap<String, PersonDecision> {
    extraction
        .extractor
        .people()
        .map(|p| (p.name.clone(), PersonDecision::CreateNew))
        .collect()
}

/// Decisions that reuse the top candidate when it is at least `min_confidence`,
/// and create everyone else
#[must_use]
pub fn accept_top_matches(parsed: &ParseResult, min_confidence: u8) -> IndexMap<String, PersonDecision> {
    parsed
        .preview
        .extracted_people
        .iter()
        .map(|p| {
            let decision = parsed
                .matches
                .get(&p.name)
                .and_then(|c| c.first())
                .filter(|c| c.confidence >= min_confidence)
                .map_or(PersonDecision::CreateNew, |c| PersonDecision::UseExisting { id: c.person_id });
            (p.name.clone(), decision)
        })
        .collect()
}
