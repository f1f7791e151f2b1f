use bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A type that can be stored as a document in its own collection.
///
/// The identity is serialized as `_id` and left empty until the store assigns
/// it on insert.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Training {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<ObjectId>,
///     name: String,
/// }
///
/// impl Model for Training {
///     fn id(&self) -> Option<ObjectId> { self.id }
///     fn set_id(&mut self, id: ObjectId) { self.id = Some(id) }
///     // collection: "trainings"
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    fn id(&self) -> Option<ObjectId>;

    fn set_id(&mut self, id: ObjectId);

    /// Called by `create` just before the model is serialized. Models that
    /// carry `created_at` / `updated_at` set both to `now` here.
    ///
    /// ```ignore
    /// fn touch_created(&mut self, now: bson::DateTime) {
    ///     self.created_at = Some(now);
    ///     self.updated_at = Some(now);
    /// }
    /// ```
    fn touch_created(&mut self, _now: bson::DateTime) {}

    /// Collection this model lives in. Defaults to the pluralized snake_case
    /// type name (`TestModel` -> `test_models`).
    fn collection_name() -> String {
        default_collection_name::<Self>()
    }
}

/// Pluralized snake_case form of `T`'s type name, without module path or
/// generic arguments.
pub fn default_collection_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let name = base.rsplit("::").next().unwrap_or(base);
    pluralize(&to_snake_case(name))
}

fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                // End of an acronym: `HTTPRequest` -> `http_request`
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                Some(_) => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn pluralize(word: &str) -> String {
    let (head, last) = match word.rfind('_') {
        Some(i) => word.split_at(i + 1),
        None => ("", word),
    };

    let plural = match last {
        "person" => "people".to_string(),
        "child" => "children".to_string(),
        "" => String::new(),
        w if w.ends_with('s')
            || w.ends_with('x')
            || w.ends_with('z')
            || w.ends_with("ch")
            || w.ends_with("sh") =>
        {
            format!("{w}es")
        }
        w if w.ends_with('y')
            && !w[..w.len() - 1].ends_with(['a', 'e', 'i', 'o', 'u']) =>
        {
            format!("{}ies", &w[..w.len() - 1])
        }
        w => format!("{w}s"),
    };

    format!("{head}{plural}")
}
