//! Fixed voucher content: the same for every request.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Round-the-clock contact printed in the footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Helpline {
    pub status: String,
    pub name: String,
    pub phone: String,
}

/// Lists and texts that do not vary per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticContent {
    pub inclusions: Vec<String>,
    pub exclusions: Vec<String>,
    pub terms: Vec<String>,
    pub helpline: Helpline,
    /// Postal address, phone, fax and email, printed on one wrapped line.
    pub address: String,
    /// Printed on its own line below the address.
    pub website: String,
    /// Optional logo drawn in the first-page banner.
    pub logo_path: PathBuf,
    pub welcome_text: String,
    pub title: String,
    /// Small print under the logo.
    pub caption: String,
}

impl Default for StaticContent {
    fn default() -> Self {
        Self::standard()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl StaticContent {
    pub fn standard() -> Self {
        Self {
            inclusions: strings(&[
                "Inclusions as per itinerary",
                "Breakfast and Dinner",
                "Visa",
                "Dubai Hotel and Tourism Dirham Fees",
            ]),
            exclusions: strings(&[
                "Arrival day breakfast",
                "Departure day Dinner",
                "Meal other than mentioned",
                "Anything not in inclusions",
            ]),
            terms: strings(&[
                "Cancellation charges apply as per policy.",
                "Trip itinerary may change due to weather.",
                "Company is not responsible for lost belongings.",
                "Late arrivals may miss scheduled activities.",
                "Extra services are charged separately.",
                "Travel insurance is recommended.",
                "Meals are included unless otherwise stated.",
            ]),
            helpline: Helpline {
                status: "24x7 Operational".to_string(),
                name: "HIREN PAREKH".to_string(),
                phone: "+97 155 4739783".to_string(),
            },
            address: "P.O Box: 46331, Bur Dubai Dubai. U.A.E | \
                      Tel: +9714 3554935 | Fax: +971 4 3554935 | \
                      Email: info@overnetdubai.com"
                .to_string(),
            website: "www.overnetdubai.com".to_string(),
            logo_path: PathBuf::from("static/triplogo.png"),
            welcome_text: "Welcome to Dubai".to_string(),
            title: "TRAVEL ITINERARY".to_string(),
            caption: "The itinerary must be carried by guest all the time along with visa copy"
                .to_string(),
        }
    }

    /// The help-line contact as one display line.
    pub fn helpline_line(&self) -> String {
        format!(
            "{}: {} {}",
            self.helpline.status, self.helpline.name, self.helpline.phone
        )
    }
}
