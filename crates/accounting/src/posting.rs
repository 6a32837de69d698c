use serde::{Deserialize, Serialize};

use rihla_core::DocumentId;

use crate::document::Artifact;

/// Result of one fan-out write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PostingOutcome {
    Created { id: DocumentId },
    Failed { reason: String },
}

impl PostingOutcome {
    pub fn created(id: DocumentId) -> Self {
        Self::Created { id }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        match self {
            Self::Created { id } => Some(id),
            Self::Failed { .. } => None,
        }
    }
}

/// Per-artifact outcomes of posting one booking. Every artifact is always
/// attempted, so all three fields are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingResult {
    pub revenue: PostingOutcome,
    pub invoice: PostingOutcome,
    pub receipt: PostingOutcome,
}

impl PostingResult {
    pub fn get(&self, artifact: Artifact) -> &PostingOutcome {
        match artifact {
            Artifact::Revenue => &self.revenue,
            Artifact::Invoice => &self.invoice,
            Artifact::Receipt => &self.receipt,
        }
    }

    pub fn set(&mut self, artifact: Artifact, outcome: PostingOutcome) {
        match artifact {
            Artifact::Revenue => self.revenue = outcome,
            Artifact::Invoice => self.invoice = outcome,
            Artifact::Receipt => self.receipt = outcome,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Artifact, &PostingOutcome)> {
        Artifact::ALL.into_iter().map(move |a| (a, self.get(a)))
    }

    pub fn all_created(&self) -> bool {
        self.iter().all(|(_, o)| o.is_created())
    }

    /// Some but not all artifacts failed.
    pub fn is_partial(&self) -> bool {
        let failed = self.failed_artifacts().len();
        failed > 0 && failed < Artifact::ALL.len()
    }

    pub fn failed_artifacts(&self) -> Vec<Artifact> {
        self.iter()
            .filter(|(_, o)| o.is_failed())
            .map(|(a, _)| a)
            .collect()
    }
}

/// Result of voiding one artifact's documents after the booking was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VoidOutcome {
    Voided { ids: Vec<DocumentId> },
    /// No document was ever posted for this artifact.
    NothingPosted,
    /// At least one linked document could not be voided. `voided` lists the
    /// ones that were.
    Failed {
        reason: String,
        #[serde(default)]
        voided: Vec<DocumentId>,
    },
}

impl VoidOutcome {
    pub fn failed(reason: impl Into<String>, voided: Vec<DocumentId>) -> Self {
        Self::Failed {
            reason: reason.into(),
            voided,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Documents this attempt marked void, whether or not it fully succeeded.
    pub fn voided_ids(&self) -> &[DocumentId] {
        match self {
            Self::Voided { ids } | Self::Failed { voided: ids, .. } => ids,
            Self::NothingPosted => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidResult {
    pub revenue: VoidOutcome,
    pub invoice: VoidOutcome,
    pub receipt: VoidOutcome,
}

impl VoidResult {
    pub fn get(&self, artifact: Artifact) -> &VoidOutcome {
        match artifact {
            Artifact::Revenue => &self.revenue,
            Artifact::Invoice => &self.invoice,
            Artifact::Receipt => &self.receipt,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Artifact, &VoidOutcome)> {
        Artifact::ALL.into_iter().map(move |a| (a, self.get(a)))
    }

    pub fn any_failed(&self) -> bool {
        self.iter().any(|(_, o)| o.is_failed())
    }
}
