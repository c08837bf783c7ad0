use anyhow::anyhow;
use todo_core::Storage;

/// `window.localStorage`, looked up on every access so a page without
/// storage degrades to an empty list instead of failing to mount.
#[derive(
  Debug, Clone, Copy, Default,
)]
pub struct LocalStorage;

fn backend()
-> anyhow::Result<web_sys::Storage> {
  web_sys::window()
    .ok_or_else(|| {
      anyhow!("no window available")
    })?
    .local_storage()
    .map_err(|error| {
      anyhow!(
        "localStorage unavailable: \
         {error:?}"
      )
    })?
    .ok_or_else(|| {
      anyhow!(
        "localStorage is disabled"
      )
    })
}

impl Storage for LocalStorage {
  fn get_item(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>>
  {
    backend()?.get_item(key).map_err(
      |error| {
        anyhow!(
          "failed reading {key} from \
           localStorage: {error:?}"
        )
      }
    )
  }

  fn set_item(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    backend()?
      .set_item(key, value)
      .map_err(|error| {
        anyhow!(
          "failed writing {key} to \
           localStorage: {error:?}"
        )
      })
  }
}
