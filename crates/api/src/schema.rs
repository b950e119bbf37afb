use std::sync::Arc;

use async_graphql::{
    ComplexObject, Context, EmptySubscription, Enum, Error, ErrorExtensions, InputObject, Object,
    Schema, SimpleObject, ID,
};
use chrono::{NaiveDate, Utc};
use entity::{employee, employee_team, team, user, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{issue_token, AuthConfig, CurrentUser, UserRole, SESSION_COOKIE};
use crate::counter::{self, CounterError, EMPLOYEE_ID_SEQUENCE};
use crate::credentials::{hash_password, verify_password, CredentialError};

pub struct AppSchema(pub Schema<QueryRoot, MutationRoot, EmptySubscription>);

pub fn build_schema(db: Arc<DatabaseConnection>, auth: Arc<AuthConfig>) -> AppSchema {
    let schema = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .data(auth)
        .finish();
    AppSchema(schema)
}

pub struct QueryRoot;
pub struct MutationRoot;

const MAX_PAGE: i32 = 200;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "entity::user::Role")]
pub enum Role {
    Admin,
    User,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "entity::Status")]
pub enum LifecycleStatus {
    Active,
    Inactive,
    OnLeave,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct UserNode {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: LifecycleStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl UserNode {
    fn from_model(model: user::Model) -> Self {
        Self {
            id: ID(model.id.to_string()),
            name: model.name,
            email: model.email,
            role: model.role.into(),
            status: model.status.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ContactInfoNode {
    pub phone: String,
    pub emergency_contact: String,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(complex)]
pub struct EmployeeNode {
    pub id: ID,
    pub user_id: ID,
    pub employee_id: String,
    pub position: String,
    pub department: String,
    pub skills: Vec<String>,
    pub contact_info: ContactInfoNode,
    pub status: LifecycleStatus,
    pub hire_date: Option<NaiveDate>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl EmployeeNode {
    fn from_model(model: employee::Model) -> Self {
        Self {
            id: ID(model.id.to_string()),
            user_id: ID(model.user_id.to_string()),
            employee_id: model.employee_id,
            position: model.position,
            department: model.department,
            skills: model.skills.0,
            contact_info: ContactInfoNode {
                phone: model.contact_info.phone,
                emergency_contact: model.contact_info.emergency_contact,
            },
            status: model.status.into(),
            hire_date: model.hire_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[ComplexObject]
impl EmployeeNode {
    async fn user(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserNode>> {
        let db = database(ctx)?;
        let user_id = parse_uuid(&self.user_id)?;
        let model = user::Entity::find_by_id(user_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(model.map(UserNode::from_model))
    }

    async fn teams(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<TeamNode>> {
        let db = database(ctx)?;
        let employee_id = parse_uuid(&self.id)?;
        let memberships = employee_team::Entity::find()
            .filter(employee_team::Column::EmployeeId.eq(employee_id))
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        let team_ids: Vec<Uuid> = memberships.iter().map(|m| m.team_id).collect();
        if team_ids.is_empty() {
            return Ok(vec![]);
        }
        let teams = team::Entity::find()
            .filter(team::Column::Id.is_in(team_ids))
            .order_by_asc(team::Column::Name)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(teams.into_iter().map(TeamNode::from_model).collect())
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct TeamNode {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

impl TeamNode {
    fn from_model(model: team::Model) -> Self {
        Self {
            id: ID(model.id.to_string()),
            name: model.name,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AuthPayload {
    pub ok: bool,
    pub user: Option<UserNode>,
    pub error: Option<String>,
}

impl AuthPayload {
    fn rejected(message: &str) -> Self {
        Self {
            ok: false,
            user: None,
            error: Some(message.to_string()),
        }
    }
}

#[derive(InputObject)]
pub struct ContactInfoInput {
    pub phone: String,
    pub emergency_contact: String,
}

#[derive(InputObject)]
pub struct NewUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub status: Option<LifecycleStatus>,
}

#[derive(InputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<LifecycleStatus>,
}

#[derive(InputObject)]
pub struct NewEmployeeInput {
    pub user_id: ID,
    /// Explicit business identifier for imports; left empty, the next
    /// `EMP-<n>` is drawn from the counter store.
    pub employee_id: Option<String>,
    pub position: String,
    pub department: String,
    pub skills: Option<Vec<String>>,
    pub contact_info: ContactInfoInput,
    pub status: Option<LifecycleStatus>,
    pub hire_date: Option<NaiveDate>,
    pub team_ids: Option<Vec<ID>>,
}

#[derive(InputObject)]
pub struct UpdateEmployeeInput {
    pub position: Option<String>,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
    pub contact_info: Option<ContactInfoInput>,
    pub status: Option<LifecycleStatus>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(InputObject)]
pub struct NewTeamInput {
    pub name: String,
    pub description: Option<String>,
}

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<UserNode> {
        let viewer = require_viewer(ctx)?;
        let db = database(ctx)?;
        let model = user::Entity::find_by_id(viewer.user_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("UNAUTHENTICATED", "Login required"))?;
        Ok(UserNode::from_model(model))
    }

    async fn users(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        offset: Option<i32>,
        q: Option<String>,
    ) -> async_graphql::Result<Vec<UserNode>> {
        require_role(ctx, UserRole::Admin)?;
        let db = database(ctx)?;
        let limit = first.unwrap_or(50).clamp(1, MAX_PAGE) as u64;
        let skip = offset.unwrap_or(0).max(0) as u64;
        let mut query = user::Entity::find();
        if let Some(filter) = sanitize_optional_filter(q) {
            let pattern = format!("%{}%", filter);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(user::Column::Email).ilike(pattern.clone()))
                    .add(Expr::col(user::Column::Name).ilike(pattern)),
            );
        }
        let records = query
            .order_by_asc(user::Column::Email)
            .limit(limit)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(records.into_iter().map(UserNode::from_model).collect())
    }

    async fn employees(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        offset: Option<i32>,
        department: Option<String>,
        status: Option<LifecycleStatus>,
        q: Option<String>,
    ) -> async_graphql::Result<Vec<EmployeeNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let limit = first.unwrap_or(50).clamp(1, MAX_PAGE) as u64;
        let skip = offset.unwrap_or(0).max(0) as u64;
        let mut query = employee::Entity::find();
        if let Some(department) = sanitize_optional_filter(department) {
            query = query.filter(employee::Column::Department.eq(department));
        }
        if let Some(status) = status {
            let status: Status = status.into();
            query = query.filter(employee::Column::Status.eq(status));
        }
        if let Some(filter) = sanitize_optional_filter(q) {
            let pattern = format!("%{}%", filter);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(employee::Column::EmployeeId).ilike(pattern.clone()))
                    .add(Expr::col(employee::Column::Position).ilike(pattern.clone()))
                    .add(Expr::col(employee::Column::Department).ilike(pattern)),
            );
        }
        let records = query
            .order_by_asc(employee::Column::CreatedAt)
            .limit(limit)
            .offset(skip)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(records.into_iter().map(EmployeeNode::from_model).collect())
    }

    async fn employee(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<EmployeeNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&id)?;
        let model = employee::Entity::find_by_id(employee_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(model.map(EmployeeNode::from_model))
    }

    async fn teams(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<TeamNode>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let records = team::Entity::find()
            .order_by_asc(team::Column::Name)
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(records.into_iter().map(TeamNode::from_model).collect())
    }
}

#[Object]
impl MutationRoot {
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<AuthPayload> {
        let auth = auth_config(ctx)?;
        let db = database(ctx)?;
        let normalized = normalize_email(&email)?;
        let Some(user) = user::Entity::find()
            .filter(user::Column::Email.eq(normalized))
            .one(db.as_ref())
            .await
            .map_err(db_error)?
        else {
            return Ok(AuthPayload::rejected("Invalid credentials"));
        };
        if user.status != Status::Active {
            return Ok(AuthPayload::rejected("Account disabled"));
        }
        if !verify_password(&password, &user.password_hash).map_err(credential_error)? {
            return Ok(AuthPayload::rejected("Invalid credentials"));
        }
        let role = UserRole::from(user.role);
        let token = issue_token(user.id, role, &auth)
            .map_err(|_| error_with_code("INTERNAL", "Failed to issue session token"))?;
        append_session_cookie(ctx, &token, auth.session_ttl_minutes);
        Ok(AuthPayload {
            ok: true,
            user: Some(UserNode::from_model(user)),
            error: None,
        })
    }

    async fn logout(&self, ctx: &Context<'_>) -> async_graphql::Result<bool> {
        append_session_cookie(ctx, "", -1);
        Ok(true)
    }

    async fn register_user(
        &self,
        ctx: &Context<'_>,
        input: NewUserInput,
    ) -> async_graphql::Result<UserNode> {
        require_role(ctx, UserRole::Admin)?;
        let db = database(ctx)?;
        let email = normalize_email(&input.email)?;
        let name = validate_required_text(&input.name, "name")?;
        if input.password.is_empty() {
            return Err(validation_error("password is required"));
        }
        let now: DateTimeWithTimeZone = Utc::now().into();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(hash_password(&input.password).map_err(credential_error)?),
            role: Set(input.role.unwrap_or(Role::User).into()),
            status: Set(input.status.unwrap_or(LifecycleStatus::Active).into()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db.as_ref())
        .await
        .map_err(|err| conflict_or_db(err, "Email already registered"))?;
        Ok(UserNode::from_model(model))
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateUserInput,
    ) -> async_graphql::Result<UserNode> {
        let viewer = require_viewer(ctx)?;
        let target = parse_uuid(&id)?;
        if target != viewer.user_id || input.role.is_some() || input.status.is_some() {
            require_role(ctx, UserRole::Admin)?;
        }
        let db = database(ctx)?;
        let model = user::Entity::find_by_id(target)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Unknown user"))?;
        let mut active: user::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(validate_required_text(&name, "name")?);
        }
        if let Some(role) = input.role {
            active.role = Set(role.into());
        }
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(UserNode::from_model(model))
    }

    async fn update_user_password(
        &self,
        ctx: &Context<'_>,
        id: ID,
        password: String,
    ) -> async_graphql::Result<bool> {
        let viewer = require_viewer(ctx)?;
        let target = parse_uuid(&id)?;
        if target != viewer.user_id {
            require_role(ctx, UserRole::Admin)?;
        }
        if password.is_empty() {
            return Err(validation_error("password is required"));
        }
        let db = database(ctx)?;
        let model = user::Entity::find_by_id(target)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Unknown user"))?;
        let mut active: user::ActiveModel = model.into();
        active.password_hash = Set(hash_password(&password).map_err(credential_error)?);
        active.updated_at = Set(Utc::now().into());
        active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(true)
    }

    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        input: NewEmployeeInput,
    ) -> async_graphql::Result<EmployeeNode> {
        require_role(ctx, UserRole::Admin)?;
        let db = database(ctx)?;
        let model = create_employee_internal(db.as_ref(), input).await?;
        Ok(EmployeeNode::from_model(model))
    }

    async fn update_employee(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateEmployeeInput,
    ) -> async_graphql::Result<EmployeeNode> {
        require_role(ctx, UserRole::Admin)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&id)?;
        let model = employee::Entity::find_by_id(employee_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Unknown employee"))?;
        // The business identifier is immutable; there is deliberately no
        // input field for it.
        let mut active: employee::ActiveModel = model.into();
        if let Some(position) = input.position {
            active.position = Set(validate_required_text(&position, "position")?);
        }
        if let Some(department) = input.department {
            active.department = Set(validate_required_text(&department, "department")?);
        }
        if let Some(skills) = input.skills {
            active.skills = Set(employee::SkillList(skills));
        }
        if let Some(contact) = input.contact_info {
            active.contact_info = Set(employee::ContactInfo {
                phone: contact.phone,
                emergency_contact: contact.emergency_contact,
            });
        }
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        if let Some(hire_date) = input.hire_date {
            active.hire_date = Set(Some(hire_date));
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(db.as_ref()).await.map_err(db_error)?;
        Ok(EmployeeNode::from_model(model))
    }

    async fn create_team(
        &self,
        ctx: &Context<'_>,
        input: NewTeamInput,
    ) -> async_graphql::Result<TeamNode> {
        require_role(ctx, UserRole::Admin)?;
        let db = database(ctx)?;
        let name = validate_required_text(&input.name, "name")?;
        let model = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        }
        .insert(db.as_ref())
        .await
        .map_err(|err| conflict_or_db(err, "Team name already in use"))?;
        Ok(TeamNode::from_model(model))
    }

    async fn set_employee_teams(
        &self,
        ctx: &Context<'_>,
        employee_id: ID,
        team_ids: Vec<ID>,
    ) -> async_graphql::Result<EmployeeNode> {
        require_role(ctx, UserRole::Admin)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&employee_id)?;
        let model = employee::Entity::find_by_id(employee_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| error_with_code("NOT_FOUND", "Unknown employee"))?;
        let team_ids = resolve_team_ids(db.as_ref(), Some(team_ids)).await?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = db.begin().await.map_err(db_error)?;
        employee_team::Entity::delete_many()
            .filter(employee_team::Column::EmployeeId.eq(employee_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        for team_id in team_ids {
            employee_team::ActiveModel {
                employee_id: Set(employee_id),
                team_id: Set(team_id),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_error)?;
        }
        txn.commit().await.map_err(db_error)?;
        Ok(EmployeeNode::from_model(model))
    }
}

/// Explicit creation path: the business identifier is resolved before the
/// insert ever runs, never by a storage-layer hook. On counter failure the
/// record is not written.
#[instrument(name = "hr.create_employee", skip_all)]
async fn create_employee_internal(
    db: &DatabaseConnection,
    input: NewEmployeeInput,
) -> async_graphql::Result<employee::Model> {
    let user_id = parse_uuid(&input.user_id)?;
    let position = validate_required_text(&input.position, "position")?;
    let department = validate_required_text(&input.department, "department")?;
    let phone = validate_required_text(&input.contact_info.phone, "contactInfo.phone")?;
    let emergency_contact = validate_required_text(
        &input.contact_info.emergency_contact,
        "contactInfo.emergencyContact",
    )?;
    if user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(db_error)?
        .is_none()
    {
        return Err(validation_error("Unknown user for employee"));
    }
    let team_ids = resolve_team_ids(db, input.team_ids).await?;

    let employee_id = match input
        .employee_id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        Some(explicit) => explicit,
        None => {
            let seq = counter::increment_and_get(db, EMPLOYEE_ID_SEQUENCE)
                .await
                .map_err(identity_error)?;
            format!("EMP-{}", seq)
        }
    };

    let now: DateTimeWithTimeZone = Utc::now().into();
    let txn = db.begin().await.map_err(db_error)?;
    let model = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        employee_id: Set(employee_id),
        position: Set(position),
        department: Set(department),
        skills: Set(employee::SkillList(input.skills.unwrap_or_default())),
        contact_info: Set(employee::ContactInfo {
            phone,
            emergency_contact,
        }),
        status: Set(input.status.unwrap_or(LifecycleStatus::Active).into()),
        hire_date: Set(input.hire_date.or_else(|| Some(Utc::now().date_naive()))),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|err| conflict_or_db(err, "Employee identifier already in use"))?;
    for team_id in team_ids {
        employee_team::ActiveModel {
            employee_id: Set(model.id),
            team_id: Set(team_id),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;
    }
    txn.commit().await.map_err(db_error)?;
    Ok(model)
}

async fn resolve_team_ids(
    db: &DatabaseConnection,
    team_ids: Option<Vec<ID>>,
) -> async_graphql::Result<Vec<Uuid>> {
    let Some(ids) = team_ids else {
        return Ok(vec![]);
    };
    let mut resolved = Vec::with_capacity(ids.len());
    for id in &ids {
        let parsed = parse_uuid(id)?;
        if !resolved.contains(&parsed) {
            resolved.push(parsed);
        }
    }
    if resolved.is_empty() {
        return Ok(resolved);
    }
    let found = team::Entity::find()
        .filter(team::Column::Id.is_in(resolved.clone()))
        .all(db)
        .await
        .map_err(db_error)?;
    if found.len() != resolved.len() {
        return Err(validation_error("Unknown team in teamIds"));
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Seed data

#[derive(Debug, Clone)]
pub struct SeededHrRecords {
    pub admin: user::Model,
    pub users: Vec<user::Model>,
    pub employees: Vec<employee::Model>,
    pub teams: Vec<team::Model>,
}

/// Developer fixture data: one admin, two staff accounts with employee
/// records (identifiers drawn from the counter) and two teams.
pub async fn seed_hr_demo(db: &DatabaseConnection) -> Result<SeededHrRecords, DbErr> {
    let admin = insert_seed_user(
        db,
        "admin@staffhub.dev",
        "Avery Admin",
        user::Role::Admin,
        "admin1234",
    )
    .await?;
    let morgan = insert_seed_user(
        db,
        "morgan@staffhub.dev",
        "Morgan Reyes",
        user::Role::User,
        "morgan1234",
    )
    .await?;
    let sam = insert_seed_user(
        db,
        "sam@staffhub.dev",
        "Sam Okafor",
        user::Role::User,
        "sam1234",
    )
    .await?;

    let platform = insert_seed_team(db, "Platform", Some("Core services")).await?;
    let people = insert_seed_team(db, "People Ops", None).await?;

    let backend = insert_seed_employee(
        db,
        &morgan,
        "Backend Engineer",
        "Engineering",
        &["rust", "postgres"],
        "+1-555-0100",
        "Casey Reyes +1-555-0101",
    )
    .await?;
    let generalist = insert_seed_employee(
        db,
        &sam,
        "HR Generalist",
        "People",
        &["onboarding"],
        "+1-555-0200",
        "Ada Okafor +1-555-0201",
    )
    .await?;

    for (employee, team) in [(&backend, &platform), (&generalist, &people)] {
        employee_team::ActiveModel {
            employee_id: Set(employee.id),
            team_id: Set(team.id),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
    }

    Ok(SeededHrRecords {
        admin: admin.clone(),
        users: vec![admin, morgan, sam],
        employees: vec![backend, generalist],
        teams: vec![platform, people],
    })
}

async fn insert_seed_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    role: user::Role,
    password: &str,
) -> Result<user::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(
            hash_password(password).map_err(|err| DbErr::Custom(err.to_string()))?
        ),
        role: Set(role),
        status: Set(Status::Active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

async fn insert_seed_team(
    db: &DatabaseConnection,
    name: &str,
    description: Option<&str>,
) -> Result<team::Model, DbErr> {
    team::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.map(str::to_string)),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
}

async fn insert_seed_employee(
    db: &DatabaseConnection,
    owner: &user::Model,
    position: &str,
    department: &str,
    skills: &[&str],
    phone: &str,
    emergency_contact: &str,
) -> Result<employee::Model, DbErr> {
    let seq = counter::increment_and_get(db, EMPLOYEE_ID_SEQUENCE)
        .await
        .map_err(|err| DbErr::Custom(err.to_string()))?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner.id),
        employee_id: Set(format!("EMP-{}", seq)),
        position: Set(position.to_string()),
        department: Set(department.to_string()),
        skills: Set(employee::SkillList(
            skills.iter().map(|s| s.to_string()).collect(),
        )),
        contact_info: Set(employee::ContactInfo {
            phone: phone.to_string(),
            emergency_contact: emergency_contact.to_string(),
        }),
        status: Set(Status::Active),
        hire_date: Set(Some(Utc::now().date_naive())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

// ---------------------------------------------------------------------------
// Context and error helpers

fn database(ctx: &Context<'_>) -> async_graphql::Result<Arc<DatabaseConnection>> {
    ctx.data::<Arc<DatabaseConnection>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing database connection"))
}

fn auth_config(ctx: &Context<'_>) -> async_graphql::Result<Arc<AuthConfig>> {
    ctx.data::<Arc<AuthConfig>>()
        .cloned()
        .map_err(|_| error_with_code("INTERNAL", "Missing auth configuration"))
}

fn current_user(ctx: &Context<'_>) -> async_graphql::Result<CurrentUser> {
    ctx.data::<CurrentUser>()
        .cloned()
        .map_err(|_| error_with_code("UNAUTHENTICATED", "Login required"))
}

fn require_role(ctx: &Context<'_>, role: UserRole) -> async_graphql::Result<CurrentUser> {
    let user = current_user(ctx)?;
    if user.has_role(role) {
        Ok(user)
    } else {
        Err(error_with_code("FORBIDDEN", "Insufficient permissions"))
    }
}

fn require_viewer(ctx: &Context<'_>) -> async_graphql::Result<CurrentUser> {
    require_role(ctx, UserRole::User)
}

fn parse_uuid(id: &ID) -> async_graphql::Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| error_with_code("BAD_REQUEST", "Invalid ID"))
}

fn db_error(err: DbErr) -> Error {
    error_with_code("INTERNAL", format!("Database error: {}", err))
}

fn conflict_or_db(err: DbErr, message: &'static str) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => error_with_code("CONFLICT", message),
        _ => db_error(err),
    }
}

fn identity_error(err: CounterError) -> Error {
    error_with_code(
        "IDENTITY_ASSIGNMENT",
        format!("Failed to assign employee identifier: {}", err),
    )
}

fn credential_error(err: CredentialError) -> Error {
    error_with_code("INTERNAL", format!("Credential processing failed: {}", err))
}

fn error_with_code(code: &'static str, message: impl Into<String>) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", code))
}

fn validation_error(message: impl Into<String>) -> Error {
    error_with_code("VALIDATION", message)
}

fn append_session_cookie(ctx: &Context<'_>, token: &str, ttl_minutes: i64) {
    let max_age = (ttl_minutes.max(0) * 60).to_string();
    let cookie = if ttl_minutes < 0 {
        format!(
            "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE
        )
    } else {
        format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, token, max_age
        )
    };
    ctx.append_http_header("Set-Cookie", cookie);
}

fn normalize_email(value: &str) -> async_graphql::Result<String> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(validation_error("Invalid email address"));
    }
    Ok(trimmed)
}

fn validate_required_text(value: &str, field: &str) -> async_graphql::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(validation_error(format!("{} is required", field)));
    }
    if trimmed.chars().count() > 200 {
        return Err(validation_error(format!(
            "{} must be <= 200 characters",
            field
        )));
    }
    Ok(trimmed.to_string())
}

fn sanitize_optional_filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
