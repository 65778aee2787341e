use crate::codec::decoder::decode;
use crate::codec::encoder::encode;
use crate::codec::payload::{GridResponse, OutboundPayload};
use crate::error::{GridError, Result};
use crate::exchange::exchange::{ComponentExchange, ExchangeError};
use crate::frame::data::DataFrame;
use crate::grid::builder::{GridOptionsBuilder, OptionsBuilder};
use crate::grid::jscode::unwrap_js_code;
use crate::grid::options::RenderOptions;
use crate::metadata::RenderMetadata;

const UNSAFE_JSCODE_HINT: &str =
    ". If you're using custom JsCode objects on gridOptions, ensure that allow_unsafe_jscode is true.";

/// Renders frames in the grid component and reads the user's edits back.
///
/// Holds no state between calls: the host may call `render` again on every
/// interaction, and each call encodes, exchanges and decodes from scratch.
#[derive(Debug)]
pub struct AgGrid<E, B = GridOptionsBuilder> {
    exchange: E,
    builder: B,
}

impl<E: ComponentExchange> AgGrid<E> {
    pub fn new(exchange: E) -> Self {
        Self {
            exchange,
            builder: GridOptionsBuilder,
        }
    }
}

impl<E, B> AgGrid<E, B>
where
    E: ComponentExchange,
    B: OptionsBuilder,
{
    pub fn with_builder(exchange: E, builder: B) -> Self {
        Self { exchange, builder }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    /// Shows `dataframe` in the grid and returns the grid's current data and
    /// selection. Before the user interacts, that is the input frame and an
    /// empty selection.
    pub async fn render(&self, dataframe: &DataFrame, options: &RenderOptions) -> Result<GridResponse> {
        let mut metadata = RenderMetadata::new();
        metadata.start();

        if options.width.is_some() {
            log::warn!("DEPRECATION Warning: width parameter is deprecated and will be removed on next version.");
        }

        let encoded = encode(dataframe);
        metadata.step("Encoded frame");

        let mut grid_options = match &options.grid_options {
            Some(grid_options) => grid_options.clone(),
            None => self.builder.build(dataframe, &options.default_column_parameters),
        };
        if options.allow_unsafe_jscode {
            unwrap_js_code(&mut grid_options);
        }

        let modes = options.validate()?;

        let payload = OutboundPayload {
            grid_options,
            row_data: encoded.row_data()?,
            height: options.height,
            width: options.width,
            fit_columns_on_grid_load: options.fit_columns_on_grid_load,
            update_mode: modes.update_mode,
            data_return_mode: modes.data_return_mode,
            frame_dtypes: encoded.frame_dtypes,
            allow_unsafe_jscode: options.allow_unsafe_jscode,
            enable_enterprise_modules: options.enable_enterprise_modules,
            license_key: options.license_key.clone(),
            reload_data: options.reload_data,
            theme: modes.theme,
        };

        let component_value = match self.exchange.exchange(&payload, options.key.as_deref()).await {
            Ok(value) => value,
            Err(ExchangeError::Marshall(message)) => {
                return Err(GridError::UnsafeJsCode {
                    message: format!("{}{}", message, UNSAFE_JSCODE_HINT),
                })
            }
            Err(e) => return Err(e.into()),
        };
        metadata.step("Component exchange");

        let response = decode(
            dataframe,
            component_value,
            options.try_to_convert_back_to_original_types,
            modes.conversion_errors,
        )?;
        metadata.step("Decoded response");
        metadata.finish();

        Ok(response)
    }
}
