use crate::api::Customer;
use crate::app::AppState;

/// True when `query` occurs in the customer's name or email, ignoring case.
pub fn matches(customer: &Customer, query: &str) -> bool {
    let q = query.to_lowercase();
    customer.name.to_lowercase().contains(&q) || customer.email.to_lowercase().contains(&q)
}

/// Customers whose name or email contains `query`, in list order. The empty query keeps everyone.
pub fn filter_customers(customers: &[Customer], query: &str) -> Vec<Customer> {
    if query.is_empty() {
        return customers.to_vec();
    }
    customers
        .iter()
        .filter(|c| matches(c, query))
        .cloned()
        .collect()
}

/// Recompute the visible cards from the full list and keep the cursor in range.
pub fn apply_search(app: &mut AppState) {
    app.customers = filter_customers(&app.customers_all, &app.search_query);
    app.selected_index = app.selected_index.min(app.customers.len().saturating_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk(id: i64, name: &str, email: &str) -> Customer {
        Customer {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: "000".to_string(),
            address: "nowhere".to_string(),
        }
    }

    #[test]
    fn query_matches_name_case_insensitively() {
        let list = vec![mk(1, "Ann", "ann@x.com"), mk(2, "Bob", "bob@x.com")];
        let out = filter_customers(&list, "an");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn query_matches_email_but_not_phone_or_address() {
        let list = vec![mk(1, "Ann", "ann@acme.io"), mk(2, "Bob", "bob@x.com")];
        assert_eq!(filter_customers(&list, "ACME")[0].id, 1);
        assert!(filter_customers(&list, "nowhere").is_empty());
        assert!(filter_customers(&list, "000").is_empty());
    }

    #[test]
    fn empty_query_keeps_all_in_order() {
        let list = vec![mk(2, "Bob", "b@x"), mk(1, "Ann", "a@x")];
        assert_eq!(filter_customers(&list, ""), list);
    }

    #[test]
    fn apply_search_leaves_full_list_alone_and_clamps_cursor() {
        let mut app = AppState::default();
        app.customers_all = vec![mk(1, "Ann", "ann@x.com"), mk(2, "Bob", "bob@x.com"), mk(3, "Dana", "d@x.com")];
        app.selected_index = 2;
        app.search_query = "bob".into();
        apply_search(&mut app);
        assert_eq!(app.customers_all.len(), 3);
        assert_eq!(app.customers.len(), 1);
        assert_eq!(app.selected_index, 0);
    }
}
