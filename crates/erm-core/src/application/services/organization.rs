//! Organizational structure: areas, managements, positions and users

use chrono::Utc;
use std::sync::Arc;

use crate::application::dto::{AreaInput, CreateUser, ManagementInput, PositionInput, UpdateUser};
use crate::domain::aggregates::organization::is_plausible_email;
use crate::domain::aggregates::{Area, Management, Position, User};
use crate::domain::value_objects::{required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{require, RiskStore, Tables};

fn checked_email(tables: &Tables, email: &str, except: Option<&EntityId>) -> ServiceResult<String> {
    let email = required_text("email", email)?.to_lowercase();
    if !is_plausible_email(&email) {
        return Err(ServiceError::validation(format!("email {email} is not a valid address")));
    }
    if tables
        .users
        .values()
        .any(|u| u.email == email && Some(&u.id) != except)
    {
        return Err(ServiceError::Conflict(format!("email {email} is already registered")));
    }
    Ok(email)
}

fn checked_acronym(acronym: &str) -> ServiceResult<String> {
    let acronym = required_text("acronym", acronym)?.to_uppercase();
    if !acronym.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ServiceError::validation("acronym must be alphanumeric"));
    }
    Ok(acronym)
}

pub struct OrganizationService {
    store: Arc<RiskStore>,
}

impl OrganizationService {
    pub fn new(store: Arc<RiskStore>) -> Self {
        Self { store }
    }

    // ============ Areas ============

    pub fn create_area(&self, input: AreaInput) -> ServiceResult<Area> {
        self.store.transact(|tables| {
            let area = Area {
                id: EntityId::new(),
                name: required_text("name", &input.name)?,
                description: input.description,
                director: input.director,
                created_at: Utc::now(),
            };
            tables.areas.insert(area.id.clone(), area.clone());
            Ok(area)
        })
    }

    pub fn list_areas(&self) -> Vec<Area> {
        self.store.read(|tables| tables.areas.values().cloned().collect())
    }

    pub fn get_area(&self, id: &EntityId) -> ServiceResult<Area> {
        self.store
            .read(|tables| tables.areas.get(id).cloned().ok_or_else(|| ServiceError::not_found("area", id)))
    }

    pub fn update_area(&self, id: &EntityId, input: AreaInput) -> ServiceResult<Area> {
        self.store.transact(|tables| {
            let area = tables.areas.get_mut(id).ok_or_else(|| ServiceError::not_found("area", id))?;
            area.name = required_text("name", &input.name)?;
            area.description = input.description;
            area.director = input.director;
            Ok(area.clone())
        })
    }

    /// Refused while a process or user points at the area
    pub fn delete_area(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            if !tables.areas.contains_key(id) {
                return Err(ServiceError::not_found("area", id));
            }
            let in_use = tables.processes.values().any(|p| p.area_id.as_ref() == Some(id))
                || tables.users.values().any(|u| u.area_id.as_ref() == Some(id));
            if in_use {
                return Err(ServiceError::Conflict(format!("area {id} is still referenced")));
            }
            tables.areas.remove(id);
            Ok(())
        })
    }

    // ============ Managements ============

    pub fn create_management(&self, input: ManagementInput) -> ServiceResult<Management> {
        self.store.transact(|tables| {
            let management = Management {
                id: EntityId::new(),
                name: required_text("name", &input.name)?,
                acronym: checked_acronym(&input.acronym)?,
                description: input.description,
                created_at: Utc::now(),
            };
            tables.managements.insert(management.id.clone(), management.clone());
            Ok(management)
        })
    }

    pub fn list_managements(&self) -> Vec<Management> {
        self.store.read(|tables| tables.managements.values().cloned().collect())
    }

    pub fn get_management(&self, id: &EntityId) -> ServiceResult<Management> {
        self.store.read(|tables| {
            tables
                .managements
                .get(id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("management", id))
        })
    }

    /// Existing risk codes keep the acronym they were created with
    pub fn update_management(&self, id: &EntityId, input: ManagementInput) -> ServiceResult<Management> {
        self.store.transact(|tables| {
            let management = tables
                .managements
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("management", id))?;
            management.name = required_text("name", &input.name)?;
            management.acronym = checked_acronym(&input.acronym)?;
            management.description = input.description;
            Ok(management.clone())
        })
    }

    pub fn delete_management(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            if !tables.managements.contains_key(id) {
                return Err(ServiceError::not_found("management", id));
            }
            let in_use = tables.processes.values().any(|p| p.management_id.as_ref() == Some(id))
                || tables
                    .risks
                    .values()
                    .any(|r| r.details().management_id.as_ref() == Some(id));
            if in_use {
                return Err(ServiceError::Conflict(format!("management {id} is still referenced")));
            }
            tables.managements.remove(id);
            Ok(())
        })
    }

    // ============ Positions ============

    pub fn create_position(&self, input: PositionInput) -> ServiceResult<Position> {
        self.store.transact(|tables| {
            let position = Position {
                id: EntityId::new(),
                name: required_text("name", &input.name)?,
                description: input.description,
                created_at: Utc::now(),
            };
            tables.positions.insert(position.id.clone(), position.clone());
            Ok(position)
        })
    }

    pub fn list_positions(&self) -> Vec<Position> {
        self.store.read(|tables| tables.positions.values().cloned().collect())
    }

    pub fn update_position(&self, id: &EntityId, input: PositionInput) -> ServiceResult<Position> {
        self.store.transact(|tables| {
            let position = tables
                .positions
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("position", id))?;
            position.name = required_text("name", &input.name)?;
            position.description = input.description;
            Ok(position.clone())
        })
    }

    pub fn delete_position(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            if !tables.positions.contains_key(id) {
                return Err(ServiceError::not_found("position", id));
            }
            if tables.users.values().any(|u| u.position_id.as_ref() == Some(id)) {
                return Err(ServiceError::Conflict(format!("position {id} is still assigned")));
            }
            tables.positions.remove(id);
            Ok(())
        })
    }

    // ============ Users ============

    pub fn create_user(&self, command: CreateUser) -> ServiceResult<User> {
        let user = self.store.transact(|tables| {
            require(&tables.positions, "position", command.position_id.as_ref())?;
            require(&tables.areas, "area", command.area_id.as_ref())?;
            let user = User {
                id: EntityId::new(),
                name: required_text("name", &command.name)?,
                email: checked_email(tables, &command.email, None)?,
                role: command.role,
                position_id: command.position_id,
                area_id: command.area_id,
                active: true,
                created_at: Utc::now(),
            };
            tables.users.insert(user.id.clone(), user.clone());
            Ok::<_, ServiceError>(user)
        })?;
        tracing::info!(user_id = %user.id, role = ?user.role, "User created");
        Ok(user)
    }

    pub fn list_users(&self) -> Vec<User> {
        self.store.read(|tables| tables.users.values().cloned().collect())
    }

    pub fn get_user(&self, id: &EntityId) -> ServiceResult<User> {
        self.store.read(|tables| tables.user(id).cloned())
    }

    pub fn update_user(&self, id: &EntityId, command: UpdateUser) -> ServiceResult<User> {
        self.store.transact(|tables| {
            tables.user(id)?;
            require(&tables.positions, "position", command.position_id.as_ref().and_then(Option::as_ref))?;
            require(&tables.areas, "area", command.area_id.as_ref().and_then(Option::as_ref))?;
            let email = command
                .email
                .as_deref()
                .map(|e| checked_email(tables, e, Some(id)))
                .transpose()?;

            let user = tables.users.get_mut(id).ok_or_else(|| ServiceError::not_found("user", id))?;
            if let Some(name) = &command.name {
                user.name = required_text("name", name)?;
            }
            if let Some(email) = email {
                user.email = email;
            }
            if let Some(role) = command.role {
                user.role = role;
            }
            if let Some(position_id) = command.position_id {
                user.position_id = position_id;
            }
            if let Some(area_id) = command.area_id {
                user.area_id = area_id;
            }
            if let Some(active) = command.active {
                user.active = active;
            }
            Ok(user.clone())
        })
    }

    /// Drops the user's process ownerships; processes owned through
    /// `owner_id` lose the reference
    pub fn delete_user(&self, id: &EntityId) -> ServiceResult<()> {
        self.store.transact(|tables| {
            tables.users.remove(id).ok_or_else(|| ServiceError::not_found("user", id))?;
            tables.process_owners.retain(|o| &o.user_id != id);
            tables.tasks.retain(|_, t| &t.user_id != id);
            tables.notifications.retain(|_, n| &n.user_id != id);
            for process in tables.processes.values_mut() {
                if process.owner_id.as_ref() == Some(id) {
                    process.owner_id = None;
                }
            }
            Ok(())
        })
    }
}
