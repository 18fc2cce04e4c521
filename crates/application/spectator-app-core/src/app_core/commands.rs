use spectator_core::{FieldEdit, Region};

#[derive(Debug, Clone)]
pub enum FormCommand {
    // Editing
    SetField(FieldEdit),
    ApplyRegion(Region),
    ResetDraft,

    // Submission
    Submit,
    AcknowledgeOutcome,
}
