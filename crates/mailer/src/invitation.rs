use crate::OutgoingEmail;

/// Everything needed to invite one person into a team.
#[derive(Debug, Clone)]
pub struct InvitationEmail {
    pub team_name: String,
    pub team_token: String,
    pub invitee_id: i64,
    pub invitee_email: String,
    pub invitee_name: String,
    pub inviter_name: String,
}

impl InvitationEmail {
    pub fn subject(&self) -> String {
        format!("Invitation to join team {} in AeosGPT", self.team_name)
    }

    /// Link the invitee follows to accept. The user id is percent-encoded.
    pub fn accept_link(&self, accept_base_url: &str) -> String {
        let user_id = self.invitee_id.to_string();
        format!(
            "{}/{}?userId={}",
            accept_base_url.trim_end_matches('/'),
            urlencoding::encode(&self.team_token),
            urlencoding::encode(&user_id)
        )
    }

    pub fn body(&self, accept_base_url: &str) -> String {
        format!(
            "Hello {}, you have been invited to join team {} by {}. \
             You can accept the invitation by clicking on this link: {}",
            self.invitee_name,
            self.team_name,
            self.inviter_name,
            self.accept_link(accept_base_url)
        )
    }

    pub fn render(&self, accept_base_url: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: self.invitee_email.clone(),
            to_name: Some(self.invitee_name.clone()),
            subject: self.subject(),
            body: self.body(accept_base_url),
        }
    }
}
