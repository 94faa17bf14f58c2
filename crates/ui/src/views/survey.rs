mod fields;
mod scripts;
mod view;
mod window;

pub use view::SurveyView;
#[cfg(test)]
pub(crate) use view::SurveyTestHandles;
