//! User display formatting
//!
//! Password hashes are never printed.

use crate::models::User;

pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let name_width = users
        .iter()
        .map(|u| u.username.len())
        .max()
        .unwrap_or(8)
        .max(8);
    let email_width = users
        .iter()
        .map(|u| u.email.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<email_width$}  {:<6}  {:<11}  {}\n",
        "Username",
        "Email",
        "Type",
        "Status",
        "Last Active",
        name_width = name_width,
        email_width = email_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<email_width$}  {:-<6}  {:-<11}  {:-<16}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
        email_width = email_width,
    ));

    for user in users {
        output.push_str(&format!(
            "{:<name_width$}  {:<email_width$}  {:<6}  {:<11}  {}\n",
            user.username,
            user.email,
            user.user_type.to_string(),
            user.status.to_string(),
            user.last_active
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
            name_width = name_width,
            email_width = email_width,
        ));
    }

    output
}

pub fn format_user_details(user: &User) -> String {
    let mut output = String::new();

    output.push_str(&format!("User: {} ({})\n", user.full_name(), user.username));
    output.push_str(&format!("  ID:        {}\n", user.id.as_uuid()));
    output.push_str(&format!("  Email:     {}\n", user.email));
    output.push_str(&format!("  Type:      {}\n", user.user_type));
    output.push_str(&format!("  Status:    {}\n", user.status));
    if !user.phone_number.is_empty() {
        output.push_str(&format!("  Phone:     {}\n", user.phone_number));
    }
    if let Some(position) = &user.position {
        output.push_str(&format!("  Position:  {}\n", position));
    }
    if let Some(company) = &user.company {
        output.push_str(&format!("  Company:   {}\n", company));
    }
    if !user.skills.is_empty() {
        output.push_str(&format!("  Skills:    {}\n", user.skills.join(", ")));
    }
    output.push_str(&format!(
        "  Joined:    {}\n",
        user.created_at.format("%Y-%m-%d")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_never_shown() {
        let user = User::new("jdoe", "Jane", "Doe", "jane@example.com", "$argon2id$secret");
        let list = format_user_list(std::slice::from_ref(&user));
        let details = format_user_details(&user);

        assert!(list.contains("jane@example.com"));
        assert!(list.contains("never"));
        assert!(details.contains("Jane Doe"));
        assert!(!list.contains("argon2"));
        assert!(!details.contains("argon2"));
    }
}
