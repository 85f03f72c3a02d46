//! Declarative route authorization policy.
//!
//! One table maps every protected API operation to the set of roles
//! allowed to perform it. Routes absent from the table admit nobody, so
//! forgetting to register an operation fails closed.

use crate::domain::Role;

/// A protected API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteId {
    ListExpenses,
    CreateExpense,
    UpdateExpenseStatus,
    ListBudgets,
    CreateBudget,
    UpdateBudget,
    ListCards,
    CreateCard,
    ToggleCardStatus,
    ListAuditLog,
}

static ANY_AUTHENTICATED: &[Role] = &[Role::Admin, Role::Accountant, Role::Employee, Role::Viewer];
static FINANCE: &[Role] = &[Role::Admin, Role::Accountant];
static ADMIN_ONLY: &[Role] = &[Role::Admin];

static RULES: &[(RouteId, &[Role])] = &[
    (RouteId::ListExpenses, ANY_AUTHENTICATED),
    (RouteId::CreateExpense, ANY_AUTHENTICATED),
    (RouteId::UpdateExpenseStatus, FINANCE),
    (RouteId::ListBudgets, ANY_AUTHENTICATED),
    (RouteId::CreateBudget, FINANCE),
    (RouteId::UpdateBudget, FINANCE),
    (RouteId::ListCards, ANY_AUTHENTICATED),
    (RouteId::CreateCard, ADMIN_ONLY),
    (RouteId::ToggleCardStatus, ADMIN_ONLY),
    (RouteId::ListAuditLog, ADMIN_ONLY),
];

/// Route-to-roles policy table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyTable;

impl PolicyTable {
    /// The roles admitted to a route. Empty for unknown routes.
    pub fn allowed_roles(&self, route: RouteId) -> &'static [Role] {
        RULES
            .iter()
            .find(|(r, _)| *r == route)
            .map(|(_, roles)| *roles)
            .unwrap_or(&[])
    }

    /// Whether `role` may perform `route`.
    pub fn admits(&self, route: RouteId, role: Role) -> bool {
        self.allowed_roles(route).contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finance_routes() {
        let policy = PolicyTable;
        for route in [
            RouteId::UpdateExpenseStatus,
            RouteId::CreateBudget,
            RouteId::UpdateBudget,
        ] {
            assert!(policy.admits(route, Role::Admin));
            assert!(policy.admits(route, Role::Accountant));
            assert!(!policy.admits(route, Role::Employee));
            assert!(!policy.admits(route, Role::Viewer));
        }
    }

    #[test]
    fn test_admin_only_routes() {
        let policy = PolicyTable;
        for route in [
            RouteId::CreateCard,
            RouteId::ToggleCardStatus,
            RouteId::ListAuditLog,
        ] {
            assert!(policy.admits(route, Role::Admin));
            assert!(!policy.admits(route, Role::Accountant));
            assert!(!policy.admits(route, Role::Employee));
            assert!(!policy.admits(route, Role::Viewer));
        }
    }

    #[test]
    fn test_open_routes_admit_every_role() {
        let policy = PolicyTable;
        for route in [
            RouteId::ListExpenses,
            RouteId::CreateExpense,
            RouteId::ListBudgets,
            RouteId::ListCards,
        ] {
            for role in Role::ALL {
                assert!(policy.admits(route, role));
            }
        }
    }

    #[test]
    fn test_every_route_is_registered() {
        let policy = PolicyTable;
        for route in [
            RouteId::ListExpenses,
            RouteId::CreateExpense,
            RouteId::UpdateExpenseStatus,
            RouteId::ListBudgets,
            RouteId::CreateBudget,
            RouteId::UpdateBudget,
            RouteId::ListCards,
            RouteId::CreateCard,
            RouteId::ToggleCardStatus,
            RouteId::ListAuditLog,
        ] {
            assert!(!policy.allowed_roles(route).is_empty());
        }
    }
}
