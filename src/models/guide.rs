//! Inheritance guide: the steps an heir follows to claim an account on a
//! platform, depending on what the deceased left behind.

use serde::Serialize;
use std::{fmt, str::FromStr};

/// What the heir has to work with.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InheritanceScenario {
    /// A digital will and the account password.
    WillAndPassword,
    /// A digital will but no password.
    WillOnly,
    /// Neither a will nor a password.
    Neither,
}

impl InheritanceScenario {
    pub const ALL: [InheritanceScenario; 3] = [
        InheritanceScenario::WillAndPassword,
        InheritanceScenario::WillOnly,
        InheritanceScenario::Neither,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InheritanceScenario::WillAndPassword => "will-and-password",
            InheritanceScenario::WillOnly => "will-only",
            InheritanceScenario::Neither => "neither",
        }
    }

    fn aliases(&self) -> [&'static str; 2] {
        match self {
            InheritanceScenario::WillAndPassword => ["scenario1", "有遗嘱+有密码"],
            InheritanceScenario::WillOnly => ["scenario2", "有遗嘱+无密码"],
            InheritanceScenario::Neither => ["scenario3", "无遗嘱+无密码"],
        }
    }
}

impl fmt::Display for InheritanceScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InheritanceScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        InheritanceScenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == s || scenario.aliases().contains(&s))
            .ok_or_else(|| {
                format!(
                    "invalid scenario `{}`, must be one of: {}",
                    s,
                    InheritanceScenario::ALL.map(|sc| sc.as_str()).join(", ")
                )
            })
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct InheritanceStep {
    /// 1-based position in the guide.
    pub step: u32,
    pub title: String,
    pub description: String,
    /// Documents or contacts to have ready for this step.
    pub materials: Vec<String>,
}

/// The ordered steps for claiming an account on `platform`.
pub fn inheritance_steps(platform: &str, scenario: InheritanceScenario) -> Vec<InheritanceStep> {
    let contact = || {
        vec![
            format!("{} customer service hotline", platform),
            format!("{} official support email", platform),
        ]
    };
    let legal_documents = || {
        strings(&[
            "original digital will",
            "heir's identity document",
            "death certificate",
            "proof of kinship",
        ])
    };

    let steps: Vec<(String, String, Vec<String>)> = match scenario {
        InheritanceScenario::WillAndPassword => vec![
            (
                "Prepare legal documents".into(),
                "Gather the digital will, proof of identity and the death certificate.".into(),
                legal_documents(),
            ),
            (
                format!("Contact {} support", platform),
                format!(
                    "Reach {} through its official channels and explain the inheritance request.",
                    platform
                ),
                contact(),
            ),
            (
                "Submit the application".into(),
                "Hand in every document the platform asks for.".into(),
                strings(&["all prepared legal documents", "inheritance application form"]),
            ),
            (
                "Await review".into(),
                "The platform reviews the application and may ask for more material.".into(),
                strings(&["a reachable phone number", "supplementary documents"]),
            ),
        ],
        InheritanceScenario::WillOnly => vec![
            (
                "Prepare legal documents".into(),
                "Gather the digital will, proof of identity and the death certificate.".into(),
                legal_documents(),
            ),
            (
                format!("Contact {} support", platform),
                format!(
                    "Explain the situation to {} and present the will as the basis of the claim.",
                    platform
                ),
                contact(),
            ),
            (
                "Request account recovery".into(),
                "Apply for recovery or transfer of the account under the platform's policy."
                    .into(),
                strings(&["account recovery form", "identity verification documents"]),
            ),
            (
                "Legal action".into(),
                format!("If {} refuses, the claim may have to go through the courts.", platform),
                strings(&["lawyer's letter", "court filing documents"]),
            ),
        ],
        InheritanceScenario::Neither => vec![
            (
                "Collect supporting evidence".into(),
                "Collect everything that proves the inheritance relationship.".into(),
                strings(&["proof of kinship", "death certificate", "heir's identity document"]),
            ),
            (
                format!("Contact {} support", platform),
                format!("Ask {} how its inheritance process works.", platform),
                contact(),
            ),
            (
                "Seek legal advice".into(),
                "Consult a lawyer about the heir's legal rights.".into(),
                strings(&["legal consultation", "prepared legal paperwork"]),
            ),
            (
                "Court proceedings".into(),
                format!("Access to the {} account may require a court order.", platform),
                strings(&["statement of claim", "evidence", "court summons"]),
            ),
        ],
    };

    steps
        .into_iter()
        .zip(1..)
        .map(|((title, description, materials), step)| InheritanceStep {
            step,
            title,
            description,
            materials,
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenarios_accept_their_legacy_labels() {
        assert_eq!(
            "scenario2".parse::<InheritanceScenario>(),
            Ok(InheritanceScenario::WillOnly)
        );
        assert_eq!(
            "无遗嘱+无密码".parse::<InheritanceScenario>(),
            Ok(InheritanceScenario::Neither)
        );
        let err = "scenario4".parse::<InheritanceScenario>().unwrap_err();
        assert!(err.contains("will-and-password, will-only, neither"), "{}", err);
    }

    #[test]
    fn steps_are_numbered_and_name_the_platform() {
        for scenario in InheritanceScenario::ALL {
            let steps = inheritance_steps("QQ", scenario);
            assert_eq!(steps.iter().map(|s| s.step).collect::<Vec<_>>(), [1, 2, 3, 4]);
            assert_eq!(steps[1].title, "Contact QQ support");
            assert!(steps.iter().all(|s| !s.materials.is_empty()));
        }
    }
}
