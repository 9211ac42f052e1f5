use thiserror::Error;

/// The first check a draft fails. Messages are shown to the user as-is and
/// keep the numbering of the form fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Error: 1. Situación a Reencuadrar está vacío.")]
    MissingSituation,
    #[error("Error: 2. Debes seleccionar al menos una Emoción Principal.")]
    MissingEmotion,
    #[error("Error: 3. ¿Es Actual o Recuerdo? no seleccionado.")]
    MissingTimeframe,
    #[error("Error: 4. Objeto Representativo está vacío.")]
    MissingObject,
    #[error("Error: 5. Carga Emocional fuera de rango (1-5): {0}.")]
    LoadOutOfRange(u8),
    #[error("Error: 6. Frecuencia del Pensamiento no seleccionada.")]
    MissingFrequency,
}

/// Failure of a single generation request in a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Ya hay un reencuadre en curso; espera a que termine.")]
    Busy,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Error al generar el reencuadre: {0:#}")]
    Generation(#[from] anyhow::Error),
}

/// Non-2xx answer from an upstream model API. The body is relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{engine} API error: {body}")]
pub struct UpstreamError {
    pub engine: String,
    pub status: u16,
    pub body: String,
}
